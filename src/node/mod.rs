//! Node module - In-memory representation of structured configuration
//! documents.
//!
//! Each [`Document`] owns an arena of [`Node`]s addressed by stable
//! [`NodeId`]s, so a resolved field location stays valid while the engine
//! mutates the tree in place.

mod convert;
mod node;

pub use convert::*;
pub use node::*;
