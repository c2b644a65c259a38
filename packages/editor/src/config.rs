use crate::errors::LoadError;
use crate::registry::{ComponentRegistry, ComponentSpec};
use crate::responsive::Breakpoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "trellis.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo history depth (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Breakpoint selected when the editor opens
    #[serde(default)]
    pub default_breakpoint: Breakpoint,

    /// How many pending notifications to keep before dropping the oldest
    #[serde(default = "default_max_diagnostics")]
    pub max_diagnostics: usize,

    /// Extra component types, keyed by type tag (override built-ins)
    #[serde(default)]
    pub components: BTreeMap<String, ComponentSpec>,
}

fn default_undo_levels() -> usize {
    100
}

fn default_max_diagnostics() -> usize {
    32
}

impl EditorConfig {
    /// Load config from a directory; defaults if the file is missing
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path.into())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Built-in registry extended with the configured components
    pub fn registry(&self) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for (component_type, spec) in &self.components {
            registry.register(component_type.clone(), spec.clone());
        }
        registry
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_levels: default_undo_levels(),
            default_breakpoint: Breakpoint::default(),
            max_diagnostics: default_max_diagnostics(),
            components: BTreeMap::new(),
        }
    }
}
