//! Literal value injection.

use super::{PatchError, Transform};
use crate::node::{Document, Kind, Node, NodeId, Scalar};

/// SetValue writes a literal value at each resolved location.
///
/// The held value is deep-copied on every application, so one value can be
/// stamped into many targets without aliasing between them.
#[derive(Debug, Clone)]
pub struct SetValue {
    value: Document,
}

impl SetValue {
    pub fn new(value: Document) -> Self {
        SetValue { value }
    }
}

impl Transform for SetValue {
    fn create_kind(&self) -> Option<Kind> {
        Some(self.value.node(self.value.root()).kind())
    }

    fn apply(&self, doc: &mut Document, target: NodeId) -> Result<(), PatchError> {
        let src = self.value.root();
        match (self.value.node(src), doc.node(target)) {
            // Scalar onto scalar copies only the raw value, leaving the
            // target's tag intact so its prior typing survives. A null
            // target has no typing to keep (freshly created terminals start
            // as null), so it takes the value's tag as well.
            (Node::Scalar(value), Node::Scalar(prior)) => {
                let tag = if prior.is_null() { value.tag } else { prior.tag };
                let scalar = Scalar::new(tag, value.value.clone());
                *doc.node_mut(target) = Node::Scalar(scalar);
            }
            _ => doc.replace(target, &self.value, src),
        }
        Ok(())
    }
}
