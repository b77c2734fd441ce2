//! Field path module - Addressing expressions into a document tree.
//!
//! A field path is a dot-delimited token sequence; resolution turns it into
//! zero or more concrete node locations, optionally creating missing
//! containers along the way.

mod resolve;
mod split;

pub use resolve::*;
pub use split::*;
