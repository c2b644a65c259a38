use crate::ids::{NodeId, PageId};
use crate::responsive::{effective_props, Breakpoint, Props, ResponsiveProps};
use serde::{Deserialize, Serialize};

/// One component instance in the tree being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    pub page_id: PageId,

    /// Containing node, or `None` for a root-level node
    pub parent_id: Option<NodeId>,

    /// Type tag selecting render/edit behavior (immutable)
    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(default)]
    pub props: Props,

    #[serde(default, skip_serializing_if = "ResponsiveProps::is_empty")]
    pub responsive_props: ResponsiveProps,

    /// Authoritative sibling order
    #[serde(default)]
    pub children: Vec<NodeId>,

    pub allow_children: bool,
}

impl Node {
    pub fn new(
        id: NodeId,
        page_id: PageId,
        component_type: impl Into<String>,
        props: Props,
        allow_children: bool,
    ) -> Self {
        Self {
            id,
            page_id,
            parent_id: None,
            component_type: component_type.into(),
            props,
            responsive_props: ResponsiveProps::default(),
            children: Vec::new(),
            allow_children,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn effective_props(&self, breakpoint: Breakpoint) -> Props {
        effective_props(&self.props, &self.responsive_props, breakpoint)
    }
}

/// A page owns a disjoint subset of nodes via `Node::page_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub name: String,
}
