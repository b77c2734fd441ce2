//! YAML/JSON bridging for documents.
//!
//! The engine never touches text itself; these conversions exist at the
//! boundary so callers can hand in already-parsed trees.

use serde::Deserialize;
use thiserror::Error;

use super::node::{Document, Mapping, Node, NodeId, Scalar, Tag};

/// Error type for document text bridging.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mapping key is not a scalar")]
    NonScalarKey,
}

impl Document {
    /// Builds a document from a parsed YAML value.
    pub fn from_yaml_value(value: &serde_yaml::Value) -> Result<Document, NodeError> {
        let mut doc = Document::detached();
        let root = doc.import_yaml(value)?;
        doc.set_root(root);
        Ok(doc)
    }

    /// Parses a single YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Document, NodeError> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Document::from_yaml_value(&value)
    }

    /// Parses a YAML stream into a document set, skipping empty documents.
    pub fn parse_all(text: &str) -> Result<Vec<Document>, NodeError> {
        let mut docs = Vec::new();
        for de in serde_yaml::Deserializer::from_str(text) {
            let value = serde_yaml::Value::deserialize(de)?;
            if value.is_null() {
                continue;
            }
            docs.push(Document::from_yaml_value(&value)?);
        }
        Ok(docs)
    }

    /// Renders a document set as one YAML stream.
    pub fn render_all(docs: &[Document]) -> Result<String, NodeError> {
        let mut out = String::new();
        for (i, doc) in docs.iter().enumerate() {
            if i > 0 {
                out.push_str("---\n");
            }
            out.push_str(&doc.to_yaml_string()?);
        }
        Ok(out)
    }

    pub fn to_yaml_value(&self) -> serde_yaml::Value {
        self.export_yaml(self.root())
    }

    pub fn to_yaml_string(&self) -> Result<String, NodeError> {
        Ok(serde_yaml::to_string(&self.to_yaml_value())?)
    }

    /// Parses a single JSON document.
    pub fn from_json_str(text: &str) -> Result<Document, NodeError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let mut doc = Document::detached();
        let root = doc.import_json(&value);
        doc.set_root(root);
        Ok(doc)
    }

    pub fn to_json_string(&self) -> Result<String, NodeError> {
        Ok(serde_json::to_string(&self.export_json(self.root()))?)
    }

    fn import_yaml(&mut self, value: &serde_yaml::Value) -> Result<NodeId, NodeError> {
        let node = match value {
            serde_yaml::Value::Null => Node::Scalar(Scalar::null()),
            serde_yaml::Value::Bool(b) => Node::Scalar(Scalar::new(Tag::Bool, b.to_string())),
            serde_yaml::Value::Number(n) => {
                let tag = if n.is_i64() || n.is_u64() {
                    Tag::Int
                } else {
                    Tag::Float
                };
                Node::Scalar(Scalar::new(tag, n.to_string()))
            }
            serde_yaml::Value::String(s) => Node::Scalar(Scalar::string(s.clone())),
            serde_yaml::Value::Sequence(items) => {
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    children.push(self.import_yaml(item)?);
                }
                Node::Sequence(children)
            }
            serde_yaml::Value::Mapping(m) => {
                let mut mapping = Mapping::new();
                for (key, val) in m {
                    let key = yaml_key_string(key)?;
                    let child = self.import_yaml(val)?;
                    mapping.set(key, child);
                }
                Node::Mapping(mapping)
            }
            serde_yaml::Value::Tagged(tagged) => return self.import_yaml(&tagged.value),
        };
        Ok(self.alloc(node))
    }

    fn export_yaml(&self, id: NodeId) -> serde_yaml::Value {
        match self.node(id) {
            Node::Scalar(s) => scalar_to_yaml(s),
            Node::Sequence(items) => serde_yaml::Value::Sequence(
                items.iter().map(|&c| self.export_yaml(c)).collect(),
            ),
            Node::Mapping(m) => {
                let mut out = serde_yaml::Mapping::new();
                for (k, v) in m.iter() {
                    out.insert(serde_yaml::Value::String(k.to_string()), self.export_yaml(v));
                }
                serde_yaml::Value::Mapping(out)
            }
        }
    }

    fn import_json(&mut self, value: &serde_json::Value) -> NodeId {
        let node = match value {
            serde_json::Value::Null => Node::Scalar(Scalar::null()),
            serde_json::Value::Bool(b) => Node::Scalar(Scalar::new(Tag::Bool, b.to_string())),
            serde_json::Value::Number(n) => {
                let tag = if n.is_i64() || n.is_u64() {
                    Tag::Int
                } else {
                    Tag::Float
                };
                Node::Scalar(Scalar::new(tag, n.to_string()))
            }
            serde_json::Value::String(s) => Node::Scalar(Scalar::string(s.clone())),
            serde_json::Value::Array(items) => {
                let children = items.iter().map(|item| self.import_json(item)).collect();
                Node::Sequence(children)
            }
            serde_json::Value::Object(m) => {
                let mut mapping = Mapping::new();
                for (key, val) in m {
                    let child = self.import_json(val);
                    mapping.set(key.clone(), child);
                }
                Node::Mapping(mapping)
            }
        };
        self.alloc(node)
    }

    fn export_json(&self, id: NodeId) -> serde_json::Value {
        match self.node(id) {
            Node::Scalar(s) => scalar_to_json(s),
            Node::Sequence(items) => serde_json::Value::Array(
                items.iter().map(|&c| self.export_json(c)).collect(),
            ),
            Node::Mapping(m) => {
                let mut out = serde_json::Map::new();
                for (k, v) in m.iter() {
                    out.insert(k.to_string(), self.export_json(v));
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

fn yaml_key_string(key: &serde_yaml::Value) -> Result<String, NodeError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        _ => Err(NodeError::NonScalarKey),
    }
}

/// Re-resolves a scalar from its raw value under its tag. A raw value that no
/// longer parses under the tag falls back to a plain string rather than
/// failing serialization.
fn scalar_to_yaml(s: &Scalar) -> serde_yaml::Value {
    match s.tag {
        Tag::Null => serde_yaml::Value::Null,
        Tag::Bool => match s.value.as_str() {
            "true" => serde_yaml::Value::Bool(true),
            "false" => serde_yaml::Value::Bool(false),
            _ => serde_yaml::Value::String(s.value.clone()),
        },
        Tag::Int => s
            .value
            .parse::<i64>()
            .map(|i| serde_yaml::Value::Number(i.into()))
            .unwrap_or_else(|_| serde_yaml::Value::String(s.value.clone())),
        Tag::Float => s
            .value
            .parse::<f64>()
            .map(|f| serde_yaml::Value::Number(serde_yaml::Number::from(f)))
            .unwrap_or_else(|_| serde_yaml::Value::String(s.value.clone())),
        Tag::Str => serde_yaml::Value::String(s.value.clone()),
    }
}

fn scalar_to_json(s: &Scalar) -> serde_json::Value {
    match s.tag {
        Tag::Null => serde_json::Value::Null,
        Tag::Bool => match s.value.as_str() {
            "true" => serde_json::Value::Bool(true),
            "false" => serde_json::Value::Bool(false),
            _ => serde_json::Value::String(s.value.clone()),
        },
        Tag::Int => s
            .value
            .parse::<i64>()
            .map(|i| serde_json::Value::Number(i.into()))
            .unwrap_or_else(|_| serde_json::Value::String(s.value.clone())),
        Tag::Float => s
            .value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(s.value.clone())),
        Tag::Str => serde_json::Value::String(s.value.clone()),
    }
}
