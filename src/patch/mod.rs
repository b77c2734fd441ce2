//! Patch module - Target resolution and patch engine.
//!
//! The engine walks a list of target selectors, matches them against a
//! document set, resolves each configured field path, and applies a
//! [`Transform`] at every resolved location, in order, stopping at the first
//! error. Documents mutate in place; a failed run leaves earlier mutations
//! visible.

mod engine;
mod eval;
mod set_value;
mod source;
mod vars;

#[cfg(test)]
mod apply_test;

pub use engine::*;
pub use eval::*;
pub use set_value::*;
pub use source::*;
pub use vars::*;

use thiserror::Error;

use crate::fieldpath::PathError;
use crate::node::NodeError;
use crate::resid::ResIdError;
use crate::selector::SelectorError;

/// Error type for the patch engine and its collaborators.
#[derive(Debug, Error)]
pub enum PatchError {
    // configuration errors
    #[error("target must specify resources to select")]
    MissingSelect,
    #[error("error creating target selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("expression must be specified")]
    MissingExpression,
    #[error("variable name must be specified")]
    MissingVariableName,
    #[error("duplicate variable {name:?}")]
    DuplicateVariable { name: String },
    #[error("either a literal value or a source must be specified for variable {name:?}")]
    MissingVariableSource { name: String },
    #[error("failed to parse literal value for variable {name:?}: {source}")]
    VariableValue { name: String, source: NodeError },

    // resolution errors
    #[error("unable to find field {path:?} in patch target")]
    FieldNotFound { path: String },
    #[error("unable to find or create field {path:?} in patch target")]
    FieldNotCreated { path: String },
    #[error("unable to find or create field {path:?} in patch target: {source}")]
    Create { path: String, source: PathError },
    #[error(transparent)]
    ResId(#[from] ResIdError),
    #[error("multiple matches for selector {selector}")]
    MultipleMatches { selector: String },
    #[error("nothing selected by {selector}")]
    NothingSelected { selector: String },
    #[error("fieldPath {path:?} is missing for source {id}")]
    SourceFieldMissing { path: String, id: String },
    #[error("fieldPath {path:?} is ambiguous for source {id}")]
    SourceFieldAmbiguous { path: String, id: String },

    // transform errors
    #[error("transform failed at field {path:?}: {source}")]
    Transform {
        path: String,
        #[source]
        source: Box<PatchError>,
    },
    #[error("failed to evaluate expression: {0}")]
    Eval(#[from] EvalError),
    #[error("expression produced no results")]
    NoExprResults,
    #[error("expression produced {0} results where one was expected")]
    AmbiguousExprResults(usize),
    #[error(transparent)]
    Node(#[from] NodeError),
}
