//! The target resolution and patch loop.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PatchError;
use crate::fieldpath::{resolve, split_path};
use crate::node::{Document, Kind, NodeId};
use crate::selector::{CompiledSelector, Selector};

/// Field path used when a target selector lists none.
pub const DEFAULT_FIELD_PATH: &str = "metadata.name";

/// TargetSelector names which documents to patch and where.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetSelector {
    pub select: Option<Selector>,
    pub field_paths: Vec<String>,
    pub options: Option<FieldOptions>,
}

/// Options for modifying fields in the target documents.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldOptions {
    /// Create the field if it does not exist.
    pub create: bool,
}

/// Transform is the unit of mutation logic applied at each resolved location.
pub trait Transform {
    /// Kind of node this transform would create for a missing field, or
    /// `None` when the transform cannot create fields.
    fn create_kind(&self) -> Option<Kind>;

    /// Mutates the node at `target` in place.
    fn apply(&self, doc: &mut Document, target: NodeId) -> Result<(), PatchError>;
}

/// Applies `transform` at every location selected by `targets` across the
/// document set, in selector order then document order then path order.
///
/// Documents mutate in place. The first error aborts the run; mutations made
/// before the failure remain in the document set.
pub fn apply_transform<T: Transform + ?Sized>(
    transform: &T,
    documents: &mut [Document],
    targets: &[TargetSelector],
) -> Result<(), PatchError> {
    for target in targets {
        let select = target.select.as_ref().ok_or(PatchError::MissingSelect)?;
        let compiled = CompiledSelector::new(select)?;

        let default_paths = [DEFAULT_FIELD_PATH.to_string()];
        let field_paths: &[String] = if target.field_paths.is_empty() {
            &default_paths
        } else {
            &target.field_paths
        };
        let create = target.options.is_some_and(|o| o.create);

        for doc in documents.iter_mut() {
            if !compiled.matches(doc) {
                continue;
            }
            debug!(id = %crate::resid::ResId::from_document(doc), "target matched");
            apply_to_target(transform, doc, field_paths, create)?;
        }
    }
    Ok(())
}

fn apply_to_target<T: Transform + ?Sized>(
    transform: &T,
    doc: &mut Document,
    field_paths: &[String],
    create: bool,
) -> Result<(), PatchError> {
    for path in field_paths {
        let create_kind = if create { transform.create_kind() } else { None };
        let tokens = split_path(path);
        let found = resolve(doc, &tokens, create_kind).map_err(|source| PatchError::Create {
            path: path.clone(),
            source,
        })?;
        if found.is_empty() {
            return Err(if create_kind.is_some() {
                PatchError::FieldNotCreated { path: path.clone() }
            } else {
                PatchError::FieldNotFound { path: path.clone() }
            });
        }
        debug!(path = %path, locations = found.len(), "applying transform");
        for target in found {
            transform
                .apply(doc, target)
                .map_err(|source| PatchError::Transform {
                    path: path.clone(),
                    source: Box::new(source),
                })?;
        }
    }
    Ok(())
}
