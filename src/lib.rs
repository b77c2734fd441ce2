//! # Resource Patch
//!
//! A target resolution and patch engine for structured, YAML/JSON-like
//! configuration documents.
//!
//! Given a document set, a list of target selectors, and a transform, the
//! engine locates every selected field across every matching document and
//! applies the transform in place. A companion source resolver pulls exactly
//! one named value out of the set to feed transforms with.
//!
//! ## Modules
//!
//! - [`node`] - Arena-backed in-memory representation of documents
//! - [`resid`] - Derived document identity (group/version/kind/name/namespace)
//! - [`selector`] - Compiled target selectors (identity, label, annotation axes)
//! - [`fieldpath`] - Field path splitting and resolution
//! - [`patch`] - The patch engine, source resolver, and transforms
//! - [`render`] - Interface to the external document renderer

pub mod fieldpath;
pub mod node;
pub mod patch;
pub mod render;
pub mod resid;
pub mod selector;

pub use fieldpath::{lookup, resolve, split_path, PathError};
pub use node::{Document, Kind, Node, NodeError, NodeId, Scalar, Tag};
pub use patch::{
    apply_transform, prepare_vars, select_source, EvalError, Evaluator, ExprTransform,
    FieldOptions, PatchError, SetValue, SourceSelector, TargetSelector, Transform, Var,
    DEFAULT_FIELD_PATH,
};
pub use render::{FileRenderer, RenderError, RenderOptions, Renderer};
pub use resid::{res_ids, ResId};
pub use selector::{CompiledSelector, LabelSelector, Selector, SelectorError};
