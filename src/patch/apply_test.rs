//! Engine-level scenarios for target resolution and patching.

use pretty_assertions::assert_eq;

use super::*;
use crate::node::Document;
use crate::selector::Selector;

fn parse_docs(text: &str) -> Vec<Document> {
    Document::parse_all(text).unwrap()
}

fn configmap_and_secret() -> Vec<Document> {
    parse_docs(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app-config\ndata:\n  value: old\n---\napiVersion: v1\nkind: Secret\nmetadata:\n  name: credentials\ndata:\n  value: old\n",
    )
}

fn target(selector: Selector, field_paths: &[&str], create: bool) -> TargetSelector {
    TargetSelector {
        select: Some(selector),
        field_paths: field_paths.iter().map(|p| p.to_string()).collect(),
        options: Some(FieldOptions { create }),
    }
}

#[test]
fn test_literal_injection_into_matching_document() {
    let mut documents = configmap_and_secret();
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            name: "app-*".into(),
            ..Default::default()
        },
        &["data.value"],
        false,
    )];

    apply_transform(&SetValue::new(Document::string("new")), &mut documents, &targets).unwrap();

    assert_eq!(documents[0].string_at(&["data", "value"]), Some("new"));
    // The Secret is untouched.
    assert_eq!(documents[1].string_at(&["data", "value"]), Some("old"));
}

#[test]
fn test_missing_field_without_create_fails_and_leaves_set_unchanged() {
    let mut documents = configmap_and_secret();
    let before = documents.clone();
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            name: "app-*".into(),
            ..Default::default()
        },
        &["data.missingKey"],
        false,
    )];

    let err = apply_transform(&SetValue::new(Document::string("new")), &mut documents, &targets)
        .unwrap_err();
    assert!(matches!(err, PatchError::FieldNotFound { ref path } if path == "data.missingKey"));
    assert_eq!(documents, before);
}

#[test]
fn test_missing_field_with_create_is_created() {
    let mut documents = configmap_and_secret();
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            ..Default::default()
        },
        &["data.extra"],
        true,
    )];

    apply_transform(&SetValue::new(Document::string("added")), &mut documents, &targets).unwrap();
    assert_eq!(documents[0].string_at(&["data", "extra"]), Some("added"));
    // The created field round-trips with the injected value, not a null.
    assert!(documents[0].to_yaml_string().unwrap().contains("extra: added"));
}

#[test]
fn test_wildcard_path_patches_every_element() {
    let mut documents = parse_docs(
        "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  containers:\n  - image: a\n  - image: b\n  - image: c\n",
    );
    let targets = [target(
        Selector {
            kind: "Deployment".into(),
            ..Default::default()
        },
        &["spec.containers.*.image"],
        false,
    )];

    apply_transform(&SetValue::new(Document::string("nginx:1.27")), &mut documents, &targets)
        .unwrap();

    let doc = &documents[0];
    let containers = doc.get_path(&["spec", "containers"]).unwrap();
    for &el in doc.node(containers).as_sequence().unwrap() {
        let image = doc.get_key(el, "image").unwrap();
        assert_eq!(doc.node(image).as_scalar().unwrap().value, "nginx:1.27");
    }
}

#[test]
fn test_missing_select_is_a_config_error() {
    let mut documents = configmap_and_secret();
    let targets = [TargetSelector::default()];
    let err = apply_transform(&SetValue::new(Document::string("x")), &mut documents, &targets)
        .unwrap_err();
    assert!(matches!(err, PatchError::MissingSelect));
}

#[test]
fn test_field_paths_default_to_metadata_name() {
    let mut documents = configmap_and_secret();
    let targets = [target(
        Selector {
            kind: "Secret".into(),
            ..Default::default()
        },
        &[],
        false,
    )];

    apply_transform(&SetValue::new(Document::string("renamed")), &mut documents, &targets)
        .unwrap();
    assert_eq!(documents[1].string_at(&["metadata", "name"]), Some("renamed"));
    assert_eq!(documents[0].string_at(&["metadata", "name"]), Some("app-config"));
}

#[test]
fn test_copy_on_insert_between_targets() {
    let mut documents = parse_docs(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app-a\nspec: {}\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app-b\nspec: {}\n",
    );
    let value = Document::from_yaml_str("nested:\n  field: shared\n").unwrap();
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            ..Default::default()
        },
        &["spec"],
        false,
    )];
    apply_transform(&SetValue::new(value), &mut documents, &targets).unwrap();

    // Mutate the first target's injected subtree; the second must not move.
    let field = documents[0].get_path(&["spec", "nested", "field"]).unwrap();
    let replacement = Document::string("mutated");
    documents[0].replace(field, &replacement, replacement.root());

    assert_eq!(documents[0].string_at(&["spec", "nested", "field"]), Some("mutated"));
    assert_eq!(documents[1].string_at(&["spec", "nested", "field"]), Some("shared"));
}

#[test]
fn test_first_error_aborts_but_keeps_earlier_mutations() {
    let mut documents = configmap_and_secret();
    let targets = [
        target(
            Selector {
                kind: "ConfigMap".into(),
                ..Default::default()
            },
            &["data.value"],
            false,
        ),
        target(
            Selector {
                kind: "Secret".into(),
                ..Default::default()
            },
            &["data.missingKey"],
            false,
        ),
    ];

    let err = apply_transform(&SetValue::new(Document::string("new")), &mut documents, &targets)
        .unwrap_err();
    assert!(matches!(err, PatchError::FieldNotFound { .. }));
    // The first selector's mutation is still visible.
    assert_eq!(documents[0].string_at(&["data", "value"]), Some("new"));
}

#[test]
fn test_label_and_annotation_axes_filter_targets() {
    let mut documents = parse_docs(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n  labels:\n    env: prod\ndata:\n  value: old\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n  labels:\n    env: staging\ndata:\n  value: old\n",
    );
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            label_selector: "env=prod".into(),
            ..Default::default()
        },
        &["data.value"],
        false,
    )];

    apply_transform(&SetValue::new(Document::string("new")), &mut documents, &targets).unwrap();
    assert_eq!(documents[0].string_at(&["data", "value"]), Some("new"));
    assert_eq!(documents[1].string_at(&["data", "value"]), Some("old"));
}

#[test]
fn test_selector_compile_error_surfaces_before_any_mutation() {
    let mut documents = configmap_and_secret();
    let before = documents.clone();
    let targets = [target(
        Selector {
            name: "app-(".into(),
            ..Default::default()
        },
        &["data.value"],
        false,
    )];
    let err = apply_transform(&SetValue::new(Document::string("x")), &mut documents, &targets)
        .unwrap_err();
    assert!(matches!(err, PatchError::Selector(_)));
    assert_eq!(documents, before);
}

#[test]
fn test_expression_transform_end_to_end() {
    use std::collections::BTreeMap;

    /// Upper-cases the target scalar, ignoring the expression text.
    struct UpcaseEvaluator;
    impl Evaluator for UpcaseEvaluator {
        fn evaluate(
            &self,
            _expression: &str,
            input: &Document,
        ) -> Result<Vec<Document>, EvalError> {
            let scalar = input
                .node(input.root())
                .as_scalar()
                .ok_or_else(|| EvalError::new("expected a scalar input"))?;
            Ok(vec![Document::string(scalar.value.to_uppercase())])
        }
    }

    let mut documents = configmap_and_secret();
    let evaluator = UpcaseEvaluator;
    let transform = ExprTransform::new("ascii_upcase", &evaluator, BTreeMap::new()).unwrap();
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            ..Default::default()
        },
        &["data.value"],
        false,
    )];

    apply_transform(&transform, &mut documents, &targets).unwrap();
    assert_eq!(documents[0].string_at(&["data", "value"]), Some("OLD"));
}

#[test]
fn test_create_failure_reports_path_context() {
    // A scalar stands where a mapping is needed.
    let mut documents =
        parse_docs("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app\ndata: oops\n");
    let targets = [target(
        Selector {
            kind: "ConfigMap".into(),
            ..Default::default()
        },
        &["data.value"],
        true,
    )];
    let err = apply_transform(&SetValue::new(Document::string("x")), &mut documents, &targets)
        .unwrap_err();
    match err {
        PatchError::Create { path, .. } => assert_eq!(path, "data.value"),
        other => panic!("unexpected error: {other}"),
    }
}
