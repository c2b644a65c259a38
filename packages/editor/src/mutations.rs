//! # Tree Mutations
//!
//! High-level semantic operations on the entity store.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one user-level operation
//! 2. **Validated**: structural constraints are checked before anything changes
//! 3. **Invertible**: the inverse is computed from the pre-state, for undo
//! 4. **Plain data**: mutations serialize, so they can be replayed from a script
//!
//! ## Mutation Semantics
//!
//! ### Reparent
//! - Fails if the target is missing, on another page or refuses children
//! - Fails if it would create a cycle
//!
//! ### RemoveNode
//! - Removes the node and all descendants
//! - Its inverse restores the whole subtree at its former index
//!
//! ### UpdateProps / UpdateResponsiveProps
//! - Shallow merge; the inverse replaces the map with its previous content

use crate::errors::EditorError;
use crate::ids::{NodeId, PageId};
use crate::node::{Node, Page};
use crate::responsive::{Breakpoint, Props};
use crate::store::{EntityStore, RemovedPage, RemovedSubtree, StoreResult};
use serde::{Deserialize, Serialize};

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Create an empty page
    AddPage {
        page_id: PageId,
        name: String,
        #[serde(default)]
        index: Option<usize>,
    },

    RenamePage {
        page_id: PageId,
        name: String,
    },

    /// Remove a page and all of its nodes
    RemovePage {
        page_id: PageId,
    },

    /// Put back a removed page (inverse of `RemovePage`)
    RestorePage {
        removed: RemovedPage,
    },

    /// Create a node under `parent_id` (or at page root) at `index`
    AddNode {
        node_id: NodeId,
        page_id: PageId,
        #[serde(default)]
        parent_id: Option<NodeId>,
        #[serde(default)]
        index: Option<usize>,
        component_type: String,
        #[serde(default)]
        props: Props,
        allow_children: bool,
    },

    /// Remove a node and its subtree
    RemoveNode {
        node_id: NodeId,
    },

    /// Put back a removed subtree (inverse of `RemoveNode`)
    RestoreSubtree {
        subtree: RemovedSubtree,
    },

    /// Shallow-merge into base props
    UpdateProps {
        node_id: NodeId,
        props: Props,
    },

    /// Replace base props wholesale
    ReplaceProps {
        node_id: NodeId,
        props: Props,
    },

    /// Shallow-merge into one breakpoint's overrides
    UpdateResponsiveProps {
        node_id: NodeId,
        breakpoint: Breakpoint,
        props: Props,
    },

    /// Replace one breakpoint's overrides wholesale
    ReplaceResponsiveProps {
        node_id: NodeId,
        breakpoint: Breakpoint,
        props: Props,
    },

    /// Move a node under a new parent (or to the page root) at `index`
    Reparent {
        node_id: NodeId,
        #[serde(default)]
        new_parent_id: Option<NodeId>,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Move the sibling at `from` to `to`
    ReorderSiblings {
        page_id: PageId,
        #[serde(default)]
        parent_id: Option<NodeId>,
        from: usize,
        to: usize,
    },

    /// Change the selection (`None` clears it)
    Select {
        #[serde(default)]
        node_id: Option<NodeId>,
    },
}

impl Mutation {
    /// Debug name of this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddPage { .. } => "AddPage",
            Mutation::RenamePage { .. } => "RenamePage",
            Mutation::RemovePage { .. } => "RemovePage",
            Mutation::RestorePage { .. } => "RestorePage",
            Mutation::AddNode { .. } => "AddNode",
            Mutation::RemoveNode { .. } => "RemoveNode",
            Mutation::RestoreSubtree { .. } => "RestoreSubtree",
            Mutation::UpdateProps { .. } => "UpdateProps",
            Mutation::ReplaceProps { .. } => "ReplaceProps",
            Mutation::UpdateResponsiveProps { .. } => "UpdateResponsiveProps",
            Mutation::ReplaceResponsiveProps { .. } => "ReplaceResponsiveProps",
            Mutation::Reparent { .. } => "Reparent",
            Mutation::ReorderSiblings { .. } => "ReorderSiblings",
            Mutation::Select { .. } => "Select",
        }
    }

    /// Short human-readable description, used for undo history labels
    pub fn describe(&self) -> String {
        match self {
            Mutation::AddPage { name, .. } => format!("Add page \"{}\"", name),
            Mutation::RenamePage { name, .. } => format!("Rename page to \"{}\"", name),
            Mutation::RemovePage { .. } => "Delete page".to_string(),
            Mutation::RestorePage { removed } => format!("Restore page \"{}\"", removed.page.name),
            Mutation::AddNode { component_type, .. } => format!("Add {}", component_type),
            Mutation::RemoveNode { .. } => "Delete element".to_string(),
            Mutation::RestoreSubtree { subtree } => {
                format!("Restore {} element(s)", subtree.nodes.len())
            }
            Mutation::UpdateProps { props, .. } | Mutation::ReplaceProps { props, .. } => {
                let keys: Vec<&str> = props.keys().map(String::as_str).collect();
                format!("Edit {}", keys.join(", "))
            }
            Mutation::UpdateResponsiveProps { breakpoint, .. }
            | Mutation::ReplaceResponsiveProps { breakpoint, .. } => {
                format!("Edit {} overrides", breakpoint)
            }
            Mutation::Reparent { .. } => "Move element".to_string(),
            Mutation::ReorderSiblings { .. } => "Reorder elements".to_string(),
            Mutation::Select { node_id: Some(_) } => "Select element".to_string(),
            Mutation::Select { node_id: None } => "Clear selection".to_string(),
        }
    }

    /// Apply mutation to the store with validation
    pub fn apply(&self, store: &mut EntityStore) -> StoreResult<()> {
        self.validate(store)?;

        match self {
            Mutation::AddPage {
                page_id,
                name,
                index,
            } => {
                let index = index.unwrap_or(store.pages().len());
                let page = Page {
                    id: page_id.clone(),
                    name: name.clone(),
                };
                store.insert_page(page, index)
            }

            Mutation::RenamePage { page_id, name } => store.rename_page(page_id, name.clone()).map(drop),

            Mutation::RemovePage { page_id } => store.remove_page(page_id).map(drop),

            Mutation::RestorePage { removed } => store.restore_page(removed.clone()),

            Mutation::AddNode {
                node_id,
                page_id,
                parent_id,
                index,
                component_type,
                props,
                allow_children,
            } => {
                let mut node = Node::new(
                    node_id.clone(),
                    page_id.clone(),
                    component_type.clone(),
                    props.clone(),
                    *allow_children,
                );
                node.parent_id = parent_id.clone();
                store.insert_node(node, *index).map(drop)
            }

            Mutation::RemoveNode { node_id } => store.remove_node(node_id).map(drop),

            Mutation::RestoreSubtree { subtree } => store.restore_subtree(subtree.clone()),

            Mutation::UpdateProps { node_id, props } => store.update_props(node_id, props).map(drop),

            Mutation::ReplaceProps { node_id, props } => {
                store.replace_props(node_id, props.clone()).map(drop)
            }

            Mutation::UpdateResponsiveProps {
                node_id,
                breakpoint,
                props,
            } => store
                .update_responsive_props(node_id, *breakpoint, props)
                .map(drop),

            Mutation::ReplaceResponsiveProps {
                node_id,
                breakpoint,
                props,
            } => store
                .replace_responsive_props(node_id, *breakpoint, props.clone())
                .map(drop),

            Mutation::Reparent {
                node_id,
                new_parent_id,
                index,
            } => store
                .reparent(node_id, new_parent_id.as_ref(), *index)
                .map(drop),

            Mutation::ReorderSiblings {
                page_id,
                parent_id,
                from,
                to,
            } => store.reorder_siblings(page_id, parent_id.as_ref(), *from, *to),

            Mutation::Select { node_id } => store.select(node_id.as_ref()),
        }
    }

    /// Validate without applying
    pub fn validate(&self, store: &EntityStore) -> StoreResult<()> {
        match self {
            Mutation::AddPage { page_id, .. } => {
                if store.page(page_id).is_some() {
                    return Err(EditorError::Integrity(format!("page {} already exists", page_id)));
                }
                Ok(())
            }

            Mutation::RenamePage { page_id, .. } | Mutation::RemovePage { page_id } => store
                .page(page_id)
                .map(drop)
                .ok_or_else(|| EditorError::PageNotFound(page_id.clone())),

            Mutation::RestorePage { removed } => {
                if store.page(&removed.page.id).is_some() {
                    return Err(EditorError::Integrity(format!(
                        "page {} already exists",
                        removed.page.id
                    )));
                }
                Ok(())
            }

            Mutation::AddNode {
                node_id,
                page_id,
                parent_id,
                ..
            } => {
                if store.contains(node_id) {
                    return Err(EditorError::DuplicateNode(node_id.clone()));
                }
                store.check_insert_target(page_id, parent_id.as_ref())
            }

            Mutation::RestoreSubtree { subtree } => {
                if let Some(clash) = subtree.nodes.iter().find(|n| store.contains(&n.id)) {
                    return Err(EditorError::DuplicateNode(clash.id.clone()));
                }
                store.check_insert_target(&subtree.page_id, subtree.parent_id.as_ref())
            }

            Mutation::RemoveNode { node_id }
            | Mutation::UpdateProps { node_id, .. }
            | Mutation::ReplaceProps { node_id, .. }
            | Mutation::UpdateResponsiveProps { node_id, .. }
            | Mutation::ReplaceResponsiveProps { node_id, .. } => store.get(node_id).map(drop),

            Mutation::Reparent {
                node_id,
                new_parent_id,
                ..
            } => {
                let node = store.get(node_id)?;
                store.check_insert_target(&node.page_id, new_parent_id.as_ref())?;
                match new_parent_id {
                    Some(target) if store.is_ancestor(node_id, target) => Err(EditorError::CycleRejected {
                        node: node_id.clone(),
                        target: target.clone(),
                    }),
                    _ => Ok(()),
                }
            }

            Mutation::ReorderSiblings {
                page_id,
                parent_id,
                from,
                to,
            } => {
                let len = store.sibling_ids(page_id, parent_id.as_ref())?.len();
                match [*from, *to].into_iter().find(|i| *i >= len) {
                    Some(index) => Err(EditorError::IndexOutOfRange { index, len }),
                    None => Ok(()),
                }
            }

            Mutation::Select { node_id } => match node_id {
                Some(node_id) => store.get(node_id).map(drop),
                None => Ok(()),
            },
        }
    }

    /// Compute the mutation that undoes `self`, from the state before applying it
    pub fn to_inverse(&self, store: &EntityStore) -> StoreResult<Mutation> {
        self.validate(store)?;

        Ok(match self {
            Mutation::AddPage { page_id, .. } => Mutation::RemovePage {
                page_id: page_id.clone(),
            },

            Mutation::RenamePage { page_id, .. } => Mutation::RenamePage {
                page_id: page_id.clone(),
                name: store
                    .page(page_id)
                    .map(|p| p.name.clone())
                    .ok_or_else(|| EditorError::PageNotFound(page_id.clone()))?,
            },

            Mutation::RemovePage { page_id } => Mutation::RestorePage {
                removed: store.snapshot_page(page_id)?,
            },

            Mutation::RestorePage { removed } => Mutation::RemovePage {
                page_id: removed.page.id.clone(),
            },

            Mutation::AddNode { node_id, .. } => Mutation::RemoveNode {
                node_id: node_id.clone(),
            },

            Mutation::RemoveNode { node_id } => Mutation::RestoreSubtree {
                subtree: store.snapshot_subtree(node_id)?,
            },

            Mutation::RestoreSubtree { subtree } => Mutation::RemoveNode {
                node_id: subtree.root.clone(),
            },

            Mutation::UpdateProps { node_id, .. } | Mutation::ReplaceProps { node_id, .. } => {
                Mutation::ReplaceProps {
                    node_id: node_id.clone(),
                    props: store.get(node_id)?.props.clone(),
                }
            }

            Mutation::UpdateResponsiveProps {
                node_id,
                breakpoint,
                ..
            }
            | Mutation::ReplaceResponsiveProps {
                node_id,
                breakpoint,
                ..
            } => Mutation::ReplaceResponsiveProps {
                node_id: node_id.clone(),
                breakpoint: *breakpoint,
                props: store.get(node_id)?.responsive_props.get(*breakpoint).clone(),
            },

            Mutation::Reparent { node_id, .. } => {
                let (parent_id, index) = store.position(node_id)?;
                Mutation::Reparent {
                    node_id: node_id.clone(),
                    new_parent_id: parent_id,
                    index: Some(index),
                }
            }

            Mutation::ReorderSiblings {
                page_id,
                parent_id,
                from,
                to,
            } => Mutation::ReorderSiblings {
                page_id: page_id.clone(),
                parent_id: parent_id.clone(),
                from: *to,
                to: *from,
            },

            Mutation::Select { .. } => Mutation::Select {
                node_id: store.selected().cloned(),
            },
        })
    }
}
