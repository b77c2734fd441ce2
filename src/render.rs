//! Interface to the external document renderer.
//!
//! Rendering an overlay directory into a flat document set is an external
//! concern; the engine only consumes the result. The option bag is passed
//! through untouched so an implementation can honor it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{Document, NodeError};

/// Options forwarded to the renderer. The engine does not interpret them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub reorder: Option<ReorderOption>,
    pub add_managed_by_label: bool,
    pub load_restrictions: LoadRestrictions,
    pub plugin_config: Option<PluginConfig>,
}

/// Output reordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderOption {
    Legacy,
    None,
}

/// How far outside the render root file loads may reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadRestrictions {
    #[default]
    Unknown,
    RootOnly,
    None,
}

/// Plugin-execution toggles for the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    pub plugin_restrictions: PluginRestrictions,
    pub fnp_loading_options: FnPluginLoadingOptions,
    pub helm_config: HelmConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PluginRestrictions {
    #[default]
    Unknown,
    BuiltinsOnly,
    None,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FnPluginLoadingOptions {
    /// Allow running executables.
    pub enable_exec: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelmConfig {
    pub enabled: bool,
}

/// Error reported by a renderer implementation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("build failed for path {path:?}: {reason}")]
    Build { path: PathBuf, reason: String },
    #[error("failed to read source file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// External renderer collaborator: turns a filesystem path into a flat,
/// ordered document set.
pub trait Renderer {
    fn render(&self, path: &Path, options: &RenderOptions) -> Result<Vec<Document>, RenderError>;
}

/// Renderer for the plain-file case: parses one YAML file into documents.
/// Directory builds require an external overlay engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRenderer;

impl Renderer for FileRenderer {
    fn render(&self, path: &Path, _options: &RenderOptions) -> Result<Vec<Document>, RenderError> {
        if path.is_dir() {
            return Err(RenderError::Build {
                path: path.to_path_buf(),
                reason: "directory rendering requires an external build engine".to_string(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Document::parse_all(&text)?)
    }
}
