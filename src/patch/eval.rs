//! Expression evaluation against resolved locations.
//!
//! The expression language itself lives behind the [`Evaluator`] trait; this
//! module owns the wrapping contract: the target subtree and any variables
//! are combined into one input document the expression can address by name,
//! and the single result is written back over the target.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{PatchError, Transform};
use crate::node::{Document, Kind, NodeId};

/// External expression evaluator collaborator.
pub trait Evaluator {
    /// Evaluates an expression against one input tree, returning every
    /// result it produced. The engine requires exactly one.
    fn evaluate(&self, expression: &str, input: &Document) -> Result<Vec<Document>, EvalError>;
}

/// Error reported by an evaluator implementation.
#[derive(Debug, Clone)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// ExprTransform evaluates an expression at each resolved location and
/// replaces the location with the result.
pub struct ExprTransform<'a> {
    expression: String,
    evaluator: &'a dyn Evaluator,
    variables: BTreeMap<String, Document>,
}

impl<'a> ExprTransform<'a> {
    pub fn new(
        expression: impl Into<String>,
        evaluator: &'a dyn Evaluator,
        variables: BTreeMap<String, Document>,
    ) -> Result<Self, PatchError> {
        let expression = expression.into();
        if expression.is_empty() {
            return Err(PatchError::MissingExpression);
        }
        Ok(ExprTransform {
            expression,
            evaluator,
            variables,
        })
    }

    /// Builds the evaluator input and the wrapped expression for one target.
    ///
    /// With no variables the target subtree is passed through untouched.
    /// Otherwise the input is `{target: ..., vars: {name: ...}}` and the
    /// expression is prefixed with one `.vars.<name> as $<name>` binding per
    /// variable (in name order) plus a `.target` focus, so `$name` and the
    /// bare expression both work unchanged.
    fn wrap(&self, doc: &Document, target: NodeId) -> (String, Document) {
        if self.variables.is_empty() {
            return (self.expression.clone(), doc.extract(target));
        }

        let mut input = Document::empty_mapping();
        let root = input.root();
        let target_copy = input.adopt(doc, target);
        input.map_insert(root, "target", target_copy);
        let vars = input.alloc_kind(Kind::Mapping);
        for (name, value) in &self.variables {
            let copy = input.adopt(value, value.root());
            input.map_insert(vars, name.clone(), copy);
        }
        input.map_insert(root, "vars", vars);

        let mut expression = String::new();
        for name in self.variables.keys() {
            let _ = write!(expression, ".vars.{name} as ${name} | ");
        }
        let _ = write!(expression, ".target | {}", self.expression);
        (expression, input)
    }
}

impl std::fmt::Debug for ExprTransform<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExprTransform")
            .field("expression", &self.expression)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

impl Transform for ExprTransform<'_> {
    fn create_kind(&self) -> Option<Kind> {
        // Created fields start as null scalars for the expression to fill.
        Some(Kind::Scalar)
    }

    fn apply(&self, doc: &mut Document, target: NodeId) -> Result<(), PatchError> {
        let (expression, input) = self.wrap(doc, target);
        let results = self.evaluator.evaluate(&expression, &input)?;
        let result = match results.as_slice() {
            [] => return Err(PatchError::NoExprResults),
            [result] => result,
            many => return Err(PatchError::AmbiguousExprResults(many.len())),
        };
        doc.replace(target, result, result.root());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evaluator stub that records its inputs and replays canned results.
    struct FakeEvaluator {
        results: Vec<Document>,
        seen: std::cell::RefCell<Vec<(String, Document)>>,
    }

    impl FakeEvaluator {
        fn returning(results: Vec<Document>) -> Self {
            FakeEvaluator {
                results,
                seen: std::cell::RefCell::new(Vec::new()),
            }
        }
    }

    impl Evaluator for FakeEvaluator {
        fn evaluate(
            &self,
            expression: &str,
            input: &Document,
        ) -> Result<Vec<Document>, EvalError> {
            self.seen
                .borrow_mut()
                .push((expression.to_string(), input.clone()));
            Ok(self.results.clone())
        }
    }

    #[test]
    fn test_empty_expression_is_a_config_error() {
        let eval = FakeEvaluator::returning(vec![]);
        let err = ExprTransform::new("", &eval, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, PatchError::MissingExpression));
    }

    #[test]
    fn test_without_vars_target_passes_through() {
        let eval = FakeEvaluator::returning(vec![Document::string("patched")]);
        let transform = ExprTransform::new(".x", &eval, BTreeMap::new()).unwrap();

        let mut doc = Document::from_yaml_str("data:\n  value: old\n").unwrap();
        let target = doc.get_path(&["data", "value"]).unwrap();
        transform.apply(&mut doc, target).unwrap();

        assert_eq!(doc.string_at(&["data", "value"]), Some("patched"));
        let seen = eval.seen.borrow();
        assert_eq!(seen[0].0, ".x");
        assert_eq!(seen[0].1.node(seen[0].1.root()).as_scalar().unwrap().value, "old");
    }

    #[test]
    fn test_vars_are_wrapped_and_bound() {
        let mut vars = BTreeMap::new();
        vars.insert("replicas".to_string(), Document::from_yaml_str("3\n").unwrap());
        vars.insert("image".to_string(), Document::string("nginx"));

        let eval = FakeEvaluator::returning(vec![Document::string("out")]);
        let transform = ExprTransform::new(". + $replicas", &eval, vars).unwrap();

        let mut doc = Document::from_yaml_str("count: 1\n").unwrap();
        let target = doc.get_path(&["count"]).unwrap();
        transform.apply(&mut doc, target).unwrap();

        let seen = eval.seen.borrow();
        // Bindings come out in name order, then the target focus.
        assert_eq!(
            seen[0].0,
            ".vars.image as $image | .vars.replicas as $replicas | .target | . + $replicas"
        );
        let input = &seen[0].1;
        assert!(input.get_path(&["target"]).is_some());
        assert_eq!(input.string_at(&["vars", "image"]), Some("nginx"));
        assert_eq!(input.string_at(&["vars", "replicas"]), Some("3"));
    }

    #[test]
    fn test_zero_results_is_an_error() {
        let eval = FakeEvaluator::returning(vec![]);
        let transform = ExprTransform::new(".x", &eval, BTreeMap::new()).unwrap();
        let mut doc = Document::from_yaml_str("a: 1\n").unwrap();
        let target = doc.get_path(&["a"]).unwrap();
        assert!(matches!(
            transform.apply(&mut doc, target),
            Err(PatchError::NoExprResults)
        ));
    }

    #[test]
    fn test_multiple_results_is_an_error() {
        let eval =
            FakeEvaluator::returning(vec![Document::string("a"), Document::string("b")]);
        let transform = ExprTransform::new(".x", &eval, BTreeMap::new()).unwrap();
        let mut doc = Document::from_yaml_str("a: 1\n").unwrap();
        let target = doc.get_path(&["a"]).unwrap();
        assert!(matches!(
            transform.apply(&mut doc, target),
            Err(PatchError::AmbiguousExprResults(2))
        ));
    }
}
