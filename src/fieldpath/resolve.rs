//! Field path resolution over a document tree.
//!
//! Resolution walks tokens left to right, forking over wildcard tokens, and
//! yields the surviving branch heads in original order. In lookup mode an
//! absent key prunes the branch; in create mode absent containers are created
//! along the way. An empty final result is reported by the caller, which
//! knows whether creation was requested.

use thiserror::Error;

use crate::node::{Document, Kind, Node, NodeId, Scalar};

/// Error raised while creating missing containers along a path.
#[derive(Debug, Clone, Error)]
pub enum PathError {
    #[error("cannot create field {field:?} under a scalar node")]
    CannotCreate { field: String },
}

/// Resolves a path read-only. Branches that run into absent keys, bad
/// indices, or scalar intermediates are pruned, never errors.
pub fn lookup(doc: &Document, path: &[String]) -> Vec<NodeId> {
    let mut current = vec![doc.root()];
    for raw in path {
        let mut next = Vec::new();
        for id in current {
            match doc.node(id) {
                Node::Mapping(m) => {
                    if raw == "*" {
                        next.extend(m.iter().map(|(_, v)| v));
                    } else if let Some(child) = m.get(raw) {
                        next.push(child);
                    }
                }
                Node::Sequence(items) => {
                    if raw == "*" {
                        next.extend(items.iter().copied());
                    } else if let Some((key, value)) = element_predicate(raw) {
                        next.extend(
                            items
                                .iter()
                                .copied()
                                .filter(|&el| element_matches(doc, el, key, value)),
                        );
                    } else if let Ok(index) = raw.parse::<usize>() {
                        if let Some(&el) = items.get(index) {
                            next.push(el);
                        }
                    }
                }
                Node::Scalar(_) => {}
            }
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }
    current
}

/// Resolves a path, creating missing containers of the right kind when
/// `create` is set. The terminal node is created with the requested kind and
/// left for the transform to fill.
pub fn resolve(
    doc: &mut Document,
    path: &[String],
    create: Option<Kind>,
) -> Result<Vec<NodeId>, PathError> {
    match create {
        None => Ok(lookup(doc, path)),
        Some(kind) => {
            let root = doc.root();
            resolve_create(doc, root, path, kind)
        }
    }
}

fn resolve_create(
    doc: &mut Document,
    id: NodeId,
    path: &[String],
    terminal: Kind,
) -> Result<Vec<NodeId>, PathError> {
    let Some((raw, rest)) = path.split_first() else {
        return Ok(vec![id]);
    };
    match doc.node(id) {
        Node::Mapping(m) => {
            if raw == "*" {
                let children: Vec<NodeId> = m.iter().map(|(_, v)| v).collect();
                fork(doc, children, rest, terminal)
            } else {
                let child = match doc.get_key(id, raw) {
                    Some(child) => child,
                    // A key=value token addresses sequence elements; against
                    // a mapping it prunes rather than minting a literal key.
                    None if element_predicate(raw).is_some() => return Ok(Vec::new()),
                    None => {
                        let child = doc.alloc_kind(created_kind(rest, terminal));
                        doc.map_insert(id, raw.clone(), child);
                        child
                    }
                };
                resolve_create(doc, child, rest, terminal)
            }
        }
        Node::Sequence(items) => {
            if raw == "*" {
                let items = items.clone();
                fork(doc, items, rest, terminal)
            } else if let Some((key, value)) = element_predicate(raw) {
                let matching: Vec<NodeId> = items
                    .iter()
                    .copied()
                    .filter(|&el| element_matches(doc, el, key, value))
                    .collect();
                if matching.is_empty() {
                    let (key, value) = (key.to_string(), value.to_string());
                    let element = doc.alloc_kind(Kind::Mapping);
                    let scalar = doc.alloc(Node::Scalar(Scalar::string(value)));
                    doc.map_insert(element, key, scalar);
                    doc.seq_push(id, element);
                    resolve_create(doc, element, rest, terminal)
                } else {
                    fork(doc, matching, rest, terminal)
                }
            } else if let Ok(index) = raw.parse::<usize>() {
                match index.cmp(&items.len()) {
                    std::cmp::Ordering::Less => {
                        let el = items[index];
                        resolve_create(doc, el, rest, terminal)
                    }
                    std::cmp::Ordering::Equal => {
                        let el = doc.alloc_kind(created_kind(rest, terminal));
                        doc.seq_push(id, el);
                        resolve_create(doc, el, rest, terminal)
                    }
                    std::cmp::Ordering::Greater => Ok(Vec::new()),
                }
            } else {
                Ok(Vec::new())
            }
        }
        Node::Scalar(_) => Err(PathError::CannotCreate { field: raw.clone() }),
    }
}

fn fork(
    doc: &mut Document,
    branches: Vec<NodeId>,
    rest: &[String],
    terminal: Kind,
) -> Result<Vec<NodeId>, PathError> {
    let mut out = Vec::new();
    for branch in branches {
        out.extend(resolve_create(doc, branch, rest, terminal)?);
    }
    Ok(out)
}

/// Kind for a container created mid-path: a sequence when the next token is
/// an index, otherwise a mapping; the terminal gets the requested kind.
fn created_kind(rest: &[String], terminal: Kind) -> Kind {
    match rest.first() {
        None => terminal,
        Some(next) if next.parse::<usize>().is_ok() => Kind::Sequence,
        Some(_) => Kind::Mapping,
    }
}

/// Parses a `key=value` (or `[key=value]`) sequence-element predicate.
fn element_predicate(raw: &str) -> Option<(&str, &str)> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(raw);
    let (key, value) = inner.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn element_matches(doc: &Document, element: NodeId, key: &str, value: &str) -> bool {
    doc.get_key(element, key)
        .and_then(|id| doc.node(id).as_scalar())
        .is_some_and(|s| s.value == value)
}
