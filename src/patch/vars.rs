//! Variable preparation for expression transforms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{select_source, PatchError, SourceSelector};
use crate::node::Document;

/// Var names one auxiliary value an expression may reference. Exactly one of
/// `sourceValue` (an inline literal) or `source` (a live document lookup)
/// must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Var {
    pub name: String,
    pub source_value: Option<String>,
    pub source: Option<SourceSelector>,
}

/// Resolves every variable against the document set.
///
/// Values from live lookups are deep-copied out of their documents, so later
/// patching cannot retroactively change a variable.
pub fn prepare_vars(
    vars: &[Var],
    documents: &[Document],
) -> Result<BTreeMap<String, Document>, PatchError> {
    let mut out = BTreeMap::new();
    for var in vars {
        if var.name.is_empty() {
            return Err(PatchError::MissingVariableName);
        }
        if out.contains_key(&var.name) {
            return Err(PatchError::DuplicateVariable {
                name: var.name.clone(),
            });
        }

        let value = if let Some(literal) = &var.source_value {
            Document::from_yaml_str(literal).map_err(|source| PatchError::VariableValue {
                name: var.name.clone(),
                source,
            })?
        } else if let Some(selector) = &var.source {
            let (index, node) = select_source(documents, selector)?;
            documents[index].extract(node)
        } else {
            return Err(PatchError::MissingVariableSource {
                name: var.name.clone(),
            });
        };
        out.insert(var.name.clone(), value);
    }
    Ok(out)
}
