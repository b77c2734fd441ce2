//! Arena-backed document tree.

use std::collections::BTreeMap;

/// Kind classifies the node variants a caller can ask the resolver to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Scalar,
    Sequence,
    Mapping,
}

/// Tag records the resolved scalar type so a raw value can be re-serialized
/// without losing its original typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Null,
    Bool,
    Int,
    Float,
    Str,
}

/// Scalar holds the raw string form of a leaf value together with its tag.
///
/// Keeping value and tag separate lets a transform overwrite the raw value
/// while leaving the target's prior tag intact, so a numeric-looking string
/// written into an int field stays an int.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub tag: Tag,
    pub value: String,
}

impl Scalar {
    /// Creates a scalar with an explicit tag.
    pub fn new(tag: Tag, value: impl Into<String>) -> Self {
        Scalar {
            tag,
            value: value.into(),
        }
    }

    /// Creates a null scalar.
    pub fn null() -> Self {
        Scalar {
            tag: Tag::Null,
            value: "null".to_string(),
        }
    }

    /// Creates a string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Scalar {
            tag: Tag::Str,
            value: value.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.tag == Tag::Null
    }
}

/// Mapping is an ordered set of key/child pairs with unique keys.
///
/// Order is insertion order and survives round trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, NodeId)>,
}

impl Mapping {
    pub fn new() -> Self {
        Mapping::default()
    }

    pub fn get(&self, key: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, id)| id)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts or replaces the entry for `key`, preserving its position when
    /// it already exists.
    pub fn set(&mut self, key: String, child: NodeId) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = child,
            None => self.entries.push((key, child)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(k, id)| (k.as_str(), *id))
    }
}

/// Node is one tree node in a document arena. Children are referenced by
/// [`NodeId`] into the owning [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<NodeId>),
    Mapping(Mapping),
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Node::Scalar(_) => Kind::Scalar,
            Node::Sequence(_) => Kind::Sequence,
            Node::Mapping(_) => Kind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(s) if s.is_null())
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[NodeId]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

/// NodeId is a stable index into one document's arena. Ids are never
/// invalidated; replaced subtrees simply become unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Document owns the arena for one top-level configuration document and acts
/// as the document-root wrapper around its content node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Creates a document whose root is an empty mapping.
    pub fn empty_mapping() -> Self {
        Document::new(Node::Mapping(Mapping::new()))
    }

    /// Creates a document holding a single null scalar.
    pub fn null() -> Self {
        Document::new(Node::Scalar(Scalar::null()))
    }

    /// Creates a document holding a single string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Document::new(Node::Scalar(Scalar::string(value)))
    }

    /// Creates a document from a childless root node.
    pub fn new(node: Node) -> Self {
        Document {
            nodes: vec![node],
            root: NodeId(0),
        }
    }

    pub(crate) fn detached() -> Self {
        Document {
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Adds a node to the arena and returns its id.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Adds an empty node of the given kind. Scalars start as null; the value
    /// is filled in by whoever requested creation.
    pub fn alloc_kind(&mut self, kind: Kind) -> NodeId {
        match kind {
            Kind::Scalar => self.alloc(Node::Scalar(Scalar::null())),
            Kind::Sequence => self.alloc(Node::Sequence(Vec::new())),
            Kind::Mapping => self.alloc(Node::Mapping(Mapping::new())),
        }
    }

    /// Deep-copies the subtree rooted at `id` in `other` into this arena and
    /// returns the copy's root id. This is the copy-on-insert primitive: a
    /// value stamped into several documents never aliases between them.
    pub fn adopt(&mut self, other: &Document, id: NodeId) -> NodeId {
        match other.node(id) {
            Node::Scalar(s) => self.alloc(Node::Scalar(s.clone())),
            Node::Sequence(items) => {
                let copied = items.iter().map(|&c| self.adopt(other, c)).collect();
                self.alloc(Node::Sequence(copied))
            }
            Node::Mapping(m) => {
                let mut copied = Mapping::new();
                for (k, v) in m.iter() {
                    let child = self.adopt(other, v);
                    copied.set(k.to_string(), child);
                }
                self.alloc(Node::Mapping(copied))
            }
        }
    }

    /// Overwrites the node at `target` with a deep copy of the subtree rooted
    /// at `src` in `other`. The previous subtree becomes unreachable.
    pub fn replace(&mut self, target: NodeId, other: &Document, src: NodeId) {
        let copied = self.adopt(other, src);
        let node = self.nodes[copied.0].clone();
        self.nodes[target.0] = node;
    }

    /// Returns a standalone document holding a deep copy of the subtree
    /// rooted at `id`.
    pub fn extract(&self, id: NodeId) -> Document {
        let mut out = Document::detached();
        let root = out.adopt(self, id);
        out.set_root(root);
        out
    }

    /// Looks up a mapping child by key.
    pub fn get_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.node(id).as_mapping().and_then(|m| m.get(key))
    }

    /// Walks a chain of mapping keys from the root.
    pub fn get_path(&self, path: &[&str]) -> Option<NodeId> {
        let mut id = self.root;
        for key in path {
            id = self.get_key(id, key)?;
        }
        Some(id)
    }

    /// Returns the non-null scalar string at a chain of mapping keys.
    pub fn string_at(&self, path: &[&str]) -> Option<&str> {
        match self.node(self.get_path(path)?) {
            Node::Scalar(s) if !s.is_null() => Some(s.value.as_str()),
            _ => None,
        }
    }

    /// Collects the scalar entries of the mapping at `path` into a map,
    /// skipping non-scalar values. Used for label and annotation lookups.
    pub fn string_map(&self, path: &[&str]) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let Some(id) = self.get_path(path) else {
            return out;
        };
        if let Node::Mapping(m) = self.node(id) {
            for (k, v) in m.iter() {
                if let Node::Scalar(s) = self.node(v) {
                    out.insert(k.to_string(), s.value.clone());
                }
            }
        }
        out
    }

    /// Inserts or replaces a mapping entry. No-op if `map` is not a mapping.
    pub fn map_insert(&mut self, map: NodeId, key: impl Into<String>, child: NodeId) {
        if let Node::Mapping(m) = self.node_mut(map) {
            m.set(key.into(), child);
        }
    }

    /// Appends to a sequence. No-op if `seq` is not a sequence.
    pub fn seq_push(&mut self, seq: NodeId, child: NodeId) {
        if let Node::Sequence(items) = self.node_mut(seq) {
            items.push(child);
        }
    }
}
