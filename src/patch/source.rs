//! Source resolution: pulling exactly one value out of the document set.

use serde::{Deserialize, Serialize};

use super::PatchError;
use crate::fieldpath::{lookup, split_path};
use crate::node::{Document, NodeId};
use crate::resid::{res_ids, ResId};

/// SourceSelector identifies exactly one document, and optionally one field
/// inside it, to read a value from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceSelector {
    #[serde(flatten)]
    pub id: ResId,
    pub field_path: String,
}

impl std::fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field_path.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}:{}", self.id, self.field_path)
        }
    }
}

/// Finds the single document (and field, if `fieldPath` is set) matched by
/// the selector, returning its index in the set and the resolved node.
///
/// Documents are matched against every identity they answer to, including
/// previous identities recorded by build annotations. Zero or multiple
/// matching documents is a hard error; the resolved node is returned
/// uncopied, so callers embedding it elsewhere must copy explicitly.
pub fn select_source(
    documents: &[Document],
    selector: &SourceSelector,
) -> Result<(usize, NodeId), PatchError> {
    let mut matched: Option<usize> = None;
    for (index, doc) in documents.iter().enumerate() {
        let ids = res_ids(doc)?;
        if ids.iter().any(|id| id.is_selected_by(&selector.id)) {
            if matched.is_some() {
                return Err(PatchError::MultipleMatches {
                    selector: selector.to_string(),
                });
            }
            matched = Some(index);
        }
    }
    let index = matched.ok_or_else(|| PatchError::NothingSelected {
        selector: selector.to_string(),
    })?;

    let doc = &documents[index];
    if selector.field_path.is_empty() {
        return Ok((index, doc.root()));
    }

    let found = lookup(doc, &split_path(&selector.field_path));
    if found.len() > 1 {
        return Err(PatchError::SourceFieldAmbiguous {
            path: selector.field_path.clone(),
            id: selector.id.to_string(),
        });
    }
    match found.first() {
        // A null result counts as missing, same as no result at all.
        Some(&node) if !doc.node(node).is_null() => Ok((index, node)),
        _ => Err(PatchError::SourceFieldMissing {
            path: selector.field_path.clone(),
            id: selector.id.to_string(),
        }),
    }
}
