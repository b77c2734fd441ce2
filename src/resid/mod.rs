//! Resid module - Derived document identity.
//!
//! An identity is computed from a document's standard fields on demand, never
//! stored; absent fields degrade to empty strings so partial documents can
//! still be matched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::Document;

/// Annotation carrying the kinds a document held before earlier renames.
pub const PREVIOUS_KINDS_ANNOTATION: &str = "internal.config.kubernetes.io/previousKinds";
/// Annotation carrying the names a document held before earlier renames.
pub const PREVIOUS_NAMES_ANNOTATION: &str = "internal.config.kubernetes.io/previousNames";
/// Annotation carrying the namespaces a document held before earlier moves.
pub const PREVIOUS_NAMESPACES_ANNOTATION: &str =
    "internal.config.kubernetes.io/previousNamespaces";

/// ResId identifies one document by group/version/kind plus name and
/// namespace. Empty components on a selector-side id mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResId {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// Splits an apiVersion string into group and version. A string without a
/// separator is all version, with an empty group.
pub fn parse_group_version(api_version: &str) -> (String, String) {
    match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

impl ResId {
    /// Derives the current identity of a document. Best effort: missing
    /// fields come back empty rather than failing.
    pub fn from_document(doc: &Document) -> ResId {
        let (group, version) = parse_group_version(doc.string_at(&["apiVersion"]).unwrap_or(""));
        ResId {
            group,
            version,
            kind: doc.string_at(&["kind"]).unwrap_or("").to_string(),
            name: doc.string_at(&["metadata", "name"]).unwrap_or("").to_string(),
            namespace: doc
                .string_at(&["metadata", "namespace"])
                .unwrap_or("")
                .to_string(),
        }
    }

    /// Component-wise exact match where the selector's empty components act
    /// as wildcards.
    pub fn is_selected_by(&self, selector: &ResId) -> bool {
        fn component(actual: &str, wanted: &str) -> bool {
            wanted.is_empty() || wanted == actual
        }
        component(&self.group, &selector.group)
            && component(&self.version, &selector.version)
            && component(&self.kind, &selector.kind)
            && component(&self.name, &selector.name)
            && component(&self.namespace, &selector.namespace)
    }

    fn or_placeholder(s: &str) -> &str {
        if s.is_empty() { "~" } else { s }
    }
}

impl std::fmt::Display for ResId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            ResId::or_placeholder(&self.group),
            ResId::or_placeholder(&self.version),
            ResId::or_placeholder(&self.kind),
            ResId::or_placeholder(&self.namespace),
            ResId::or_placeholder(&self.name),
        )
    }
}

/// Error raised when the previous-identity annotations disagree.
#[derive(Debug, Error)]
pub enum ResIdError {
    #[error("mismatched previous-identity annotations on {id}")]
    MismatchedPreviousIds { id: ResId },
}

/// Returns every identity the document answers to: its current identity
/// first, then any previous identities recorded by build annotations.
pub fn res_ids(doc: &Document) -> Result<Vec<ResId>, ResIdError> {
    let current = ResId::from_document(doc);
    let annotations = doc.string_map(&["metadata", "annotations"]);

    let kinds = annotations.get(PREVIOUS_KINDS_ANNOTATION);
    let names = annotations.get(PREVIOUS_NAMES_ANNOTATION);
    let namespaces = annotations.get(PREVIOUS_NAMESPACES_ANNOTATION);

    let mut ids = vec![current.clone()];
    match (kinds, names, namespaces) {
        (None, None, None) => {}
        (Some(kinds), Some(names), Some(namespaces)) => {
            let kinds: Vec<&str> = kinds.split(',').collect();
            let names: Vec<&str> = names.split(',').collect();
            let namespaces: Vec<&str> = namespaces.split(',').collect();
            if kinds.len() != names.len() || kinds.len() != namespaces.len() {
                return Err(ResIdError::MismatchedPreviousIds { id: current });
            }
            for i in 0..kinds.len() {
                ids.push(ResId {
                    group: current.group.clone(),
                    version: current.version.clone(),
                    kind: kinds[i].to_string(),
                    name: names[i].to_string(),
                    namespace: namespaces[i].to_string(),
                });
            }
        }
        _ => return Err(ResIdError::MismatchedPreviousIds { id: current }),
    }
    Ok(ids)
}
