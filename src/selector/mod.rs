//! Selector module - Decides which documents a target selector applies to.
//!
//! A [`Selector`] is plain configuration; [`CompiledSelector`] is its
//! compiled form, built once per target and reused across the whole document
//! set. Matching is conjunctive across identity, labels, and annotations.

mod labels;

pub use labels::*;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::Document;
use crate::resid::ResId;

/// Selector configuration: identity patterns plus label/annotation
/// expressions. Empty fields match everything on their axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selector {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub label_selector: String,
    pub annotation_selector: String,
}

/// Error building a compiled selector. Surfaces at construction time, never
/// per document.
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("invalid {field} pattern {pattern:?}: {source}")]
    Pattern {
        field: &'static str,
        pattern: String,
        source: regex::Error,
    },
    #[error("invalid label selector: {0}")]
    LabelSelector(#[source] RequirementError),
    #[error("invalid annotation selector: {0}")]
    AnnotationSelector(#[source] RequirementError),
}

/// A selector compiled for repeated matching.
#[derive(Debug)]
pub struct CompiledSelector {
    group: Option<Regex>,
    version: Option<Regex>,
    kind: Option<Regex>,
    name: Option<Regex>,
    namespace: Option<Regex>,
    labels: LabelSelector,
    annotations: LabelSelector,
}

impl CompiledSelector {
    pub fn new(selector: &Selector) -> Result<CompiledSelector, SelectorError> {
        Ok(CompiledSelector {
            group: compile_pattern("group", &selector.group)?,
            version: compile_pattern("version", &selector.version)?,
            kind: compile_pattern("kind", &selector.kind)?,
            name: compile_pattern("name", &selector.name)?,
            namespace: compile_pattern("namespace", &selector.namespace)?,
            labels: LabelSelector::parse(&selector.label_selector)
                .map_err(SelectorError::LabelSelector)?,
            annotations: LabelSelector::parse(&selector.annotation_selector)
                .map_err(SelectorError::AnnotationSelector)?,
        })
    }

    /// True iff identity, labels, and annotations all match. Never mutates
    /// the document.
    pub fn matches(&self, doc: &Document) -> bool {
        self.selects_id(&ResId::from_document(doc))
            && self.labels.matches(&doc.string_map(&["metadata", "labels"]))
            && self
                .annotations
                .matches(&doc.string_map(&["metadata", "annotations"]))
    }

    /// Identity axis only.
    pub fn selects_id(&self, id: &ResId) -> bool {
        fn component(pattern: &Option<Regex>, actual: &str) -> bool {
            pattern.as_ref().is_none_or(|re| re.is_match(actual))
        }
        component(&self.group, &id.group)
            && component(&self.version, &id.version)
            && component(&self.kind, &id.kind)
            && component(&self.name, &id.name)
            && component(&self.namespace, &id.namespace)
    }
}

/// Compiles one identity pattern. Patterns are anchored, with glob-style `*`
/// expanded to `.*`; remaining regex syntax passes through.
fn compile_pattern(
    field: &'static str,
    pattern: &str,
) -> Result<Option<Regex>, SelectorError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    let anchored = format!("^(?:{})$", pattern.replace('*', ".*"));
    match Regex::new(&anchored) {
        Ok(re) => Ok(Some(re)),
        Err(source) => Err(SelectorError::Pattern {
            field,
            pattern: pattern.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_yaml_str(text).unwrap()
    }

    fn configmap() -> Document {
        doc(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app-config\n  labels:\n    app: web\n  annotations:\n    team: infra\n",
        )
    }

    fn compiled(selector: Selector) -> CompiledSelector {
        CompiledSelector::new(&selector).unwrap()
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        assert!(compiled(Selector::default()).matches(&configmap()));
    }

    #[test]
    fn test_glob_name_pattern() {
        let sel = compiled(Selector {
            kind: "ConfigMap".into(),
            name: "app-*".into(),
            ..Default::default()
        });
        assert!(sel.matches(&configmap()));

        let other = doc("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: db-config\n");
        assert!(!sel.matches(&other));
    }

    #[test]
    fn test_patterns_are_anchored() {
        let sel = compiled(Selector {
            name: "app".into(),
            ..Default::default()
        });
        // "app" must not match "app-config".
        assert!(!sel.matches(&configmap()));
    }

    #[test]
    fn test_matching_is_conjunctive() {
        let base = Selector {
            kind: "ConfigMap".into(),
            label_selector: "app=web".into(),
            annotation_selector: "team=infra".into(),
            ..Default::default()
        };
        let target = configmap();
        assert!(compiled(base.clone()).matches(&target));

        // Flipping any one axis to a non-match flips the result.
        let mut s = base.clone();
        s.kind = "Secret".into();
        assert!(!compiled(s).matches(&target));

        let mut s = base.clone();
        s.label_selector = "app=api".into();
        assert!(!compiled(s).matches(&target));

        let mut s = base;
        s.annotation_selector = "team=platform".into();
        assert!(!compiled(s).matches(&target));
    }

    #[test]
    fn test_invalid_pattern_is_a_construction_error() {
        let err = CompiledSelector::new(&Selector {
            name: "app-(".into(),
            ..Default::default()
        });
        assert!(err.is_err());

        let err = CompiledSelector::new(&Selector {
            label_selector: "=web".into(),
            ..Default::default()
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_group_version_matching() {
        let deploy = doc("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n");
        let sel = compiled(Selector {
            group: "apps".into(),
            version: "v1".into(),
            ..Default::default()
        });
        assert!(sel.matches(&deploy));
        assert!(!sel.matches(&configmap())); // core group is empty
    }
}
