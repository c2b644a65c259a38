//! Component type registry.
//!
//! Maps a type tag (`"Heading"`, `"Container"`, ...) to the capability record
//! the editor needs. Dispatch on a node's type is a single lookup here.

use crate::responsive::Props;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Capabilities and defaults of one component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Palette label
    pub label: String,

    #[serde(default)]
    pub can_have_children: bool,

    #[serde(default)]
    pub default_props: Props,

    /// Key the rendering layer uses to pick its renderer
    pub render_hook: String,

    /// Key the property panel uses to pick its editor form
    pub editor_hook: String,
}

impl ComponentSpec {
    pub fn new(label: impl Into<String>, can_have_children: bool) -> Self {
        let label = label.into();
        let hook = label.to_lowercase();
        Self {
            label,
            can_have_children,
            default_props: Props::new(),
            render_hook: format!("render:{}", hook),
            editor_hook: format!("edit:{}", hook),
        }
    }

    pub fn with_default(mut self, key: &str, value: serde_json::Value) -> Self {
        self.default_props.insert(key.to_string(), value);
        self
    }
}

/// Registry of all component types known to the editor
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRegistry {
    specs: BTreeMap<String, ComponentSpec>,
}

impl ComponentRegistry {
    /// Create a registry with the built-in palette
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "Container",
            ComponentSpec::new("Container", true)
                .with_default("padding", json!("16px"))
                .with_default("direction", json!("column")),
        );
        registry.register(
            "Section",
            ComponentSpec::new("Section", true).with_default("padding", json!("48px 16px")),
        );
        registry.register(
            "Columns",
            ComponentSpec::new("Columns", true)
                .with_default("columns", json!(2))
                .with_default("gap", json!("16px")),
        );
        registry.register(
            "Heading",
            ComponentSpec::new("Heading", false)
                .with_default("text", json!("Heading"))
                .with_default("level", json!(1)),
        );
        registry.register(
            "Paragraph",
            ComponentSpec::new("Paragraph", false).with_default("text", json!("Lorem ipsum")),
        );
        registry.register(
            "Button",
            ComponentSpec::new("Button", false)
                .with_default("label", json!("Click me"))
                .with_default("href", json!("#")),
        );
        registry.register(
            "Image",
            ComponentSpec::new("Image", false)
                .with_default("src", json!(""))
                .with_default("alt", json!("")),
        );
        registry.register(
            "Link",
            ComponentSpec::new("Link", false)
                .with_default("text", json!("Link"))
                .with_default("href", json!("#")),
        );
        registry.register("Divider", ComponentSpec::new("Divider", false));
        registry
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            specs: BTreeMap::new(),
        }
    }

    /// Add or replace a component type
    pub fn register(&mut self, component_type: impl Into<String>, spec: ComponentSpec) {
        self.specs.insert(component_type.into(), spec);
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentSpec> {
        self.specs.get(component_type)
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.specs.contains_key(component_type)
    }

    /// Type tags in stable (alphabetical) order
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_capabilities() {
        let registry = ComponentRegistry::new();

        assert!(registry.get("Container").unwrap().can_have_children);
        assert!(!registry.get("Heading").unwrap().can_have_children);
        assert_eq!(registry.get("Heading").unwrap().default_props["level"], json!(1));
        assert!(registry.get("Marquee").is_none());
    }

    #[test]
    fn test_register_overrides_existing() {
        let mut registry = ComponentRegistry::new();
        let before = registry.len();
        registry.register("Heading", ComponentSpec::new("Heading", true));

        assert_eq!(registry.len(), before);
        assert!(registry.get("Heading").unwrap().can_have_children);
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: ComponentSpec = serde_json::from_str(
            r#"{ "label": "Card", "renderHook": "render:card", "editorHook": "edit:card" }"#,
        )
        .unwrap();

        assert!(!spec.can_have_children);
        assert!(spec.default_props.is_empty());
    }
}
