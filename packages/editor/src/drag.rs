//! # Drag-Drop Interaction State Machine
//!
//! ```text
//!            begin              hover(region)
//!   Idle ───────────▶ Dragging ──────────────▶ Dragging { Valid | Invalid }
//!    ▲                  │  ▲                          │
//!    │   drop / cancel  │  └──────── leave ───────────┘
//!    └──────────────────┘
//! ```
//!
//! Gesture decoding belongs to the UI; this machine only sees semantic
//! regions. Hover validity and drop resolution share one function
//! ([`resolve`]), so a region that previews as valid resolves the same way on
//! drop unless the store changed in between. Nothing here mutates the store:
//! a drop yields a [`DropResolution`] that the [`crate::Editor`] turns into a
//! mutation.

use crate::errors::EditorError;
use crate::ids::{NodeId, PageId};
use crate::node::Node;
use crate::responsive::Props;
use crate::store::{EntityStore, StoreResult};
use serde::{Deserialize, Serialize};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragSource {
    /// New component from the palette, not yet a node
    #[serde(rename_all = "camelCase")]
    Palette { component_type: String, props: Props },

    /// Existing node being moved
    #[serde(rename_all = "camelCase")]
    Existing { node_id: NodeId },
}

/// Drop-capable region registered by the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropRegion {
    /// Empty canvas area of a page
    #[serde(rename_all = "camelCase")]
    CanvasRoot { page_id: PageId },

    /// Body of a rendered node
    #[serde(rename_all = "camelCase")]
    Node { node_id: NodeId },

    /// Empty-container affordance
    #[serde(rename_all = "camelCase")]
    Placeholder { container_id: NodeId },

    /// Gap between siblings; `index` counts gaps, `0..=len`
    #[serde(rename_all = "camelCase")]
    SiblingSlot {
        page_id: PageId,
        parent_id: Option<NodeId>,
        index: usize,
    },
}

/// Outcome of a drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropResolution {
    /// Palette drop: create a node
    #[serde(rename_all = "camelCase")]
    Create {
        component_type: String,
        props: Props,
        page_id: PageId,
        parent_id: Option<NodeId>,
        index: Option<usize>,
    },

    /// Move an existing node into a container (end when `index` is `None`)
    #[serde(rename_all = "camelCase")]
    InsertIntoContainer {
        node_id: NodeId,
        container_id: NodeId,
        index: Option<usize>,
    },

    /// Array move within one sibling list
    #[serde(rename_all = "camelCase")]
    ReorderAmongSiblings {
        page_id: PageId,
        parent_id: Option<NodeId>,
        from: usize,
        to: usize,
    },

    /// Move an existing node to the page root list
    #[serde(rename_all = "camelCase")]
    MoveToRoot {
        node_id: NodeId,
        page_id: PageId,
        index: Option<usize>,
    },

    /// No mutation. `reason` is `None` for a cancel or a drop on nothing.
    Reject {
        #[serde(skip)]
        reason: Option<EditorError>,
    },
}

impl DropResolution {
    pub fn is_reject(&self) -> bool {
        matches!(self, DropResolution::Reject { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverState {
    None,
    Valid {
        region: DropRegion,
        preview: DropResolution,
    },
    Invalid {
        region: DropRegion,
        reason: EditorError,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        hover: HoverState,
    },
}

/// Tracks one in-progress drag
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn source(&self) -> Option<&DragSource> {
        match &self.state {
            DragState::Dragging { source, .. } => Some(source),
            DragState::Idle => None,
        }
    }

    /// Start a drag. Ignored (returns `false`) if one is already running.
    pub fn begin(&mut self, source: DragSource) -> bool {
        if self.is_dragging() {
            tracing::debug!("drag already in progress, ignoring begin");
            return false;
        }
        self.state = DragState::Dragging {
            source,
            hover: HoverState::None,
        };
        true
    }

    /// Pointer entered `region`
    pub fn hover(&mut self, region: DropRegion, store: &EntityStore) -> Option<&HoverState> {
        let DragState::Dragging { source, hover } = &mut self.state else {
            return None;
        };
        *hover = match resolve(source, &region, store) {
            Ok(preview) => HoverState::Valid { region, preview },
            Err(reason) => HoverState::Invalid { region, reason },
        };
        Some(&*hover)
    }

    /// Pointer left every drop region
    pub fn leave(&mut self) {
        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = HoverState::None;
        }
    }

    /// Finish the drag and return to `Idle`
    ///
    /// The hovered region is resolved again against the current store.
    pub fn drop(&mut self, store: &EntityStore) -> DropResolution {
        match std::mem::take(&mut self.state) {
            DragState::Dragging {
                source,
                hover: HoverState::Valid { region, .. },
            } => resolve(&source, &region, store)
                .unwrap_or_else(|reason| DropResolution::Reject { reason: Some(reason) }),
            DragState::Dragging {
                hover: HoverState::Invalid { reason, .. },
                ..
            } => DropResolution::Reject { reason: Some(reason) },
            DragState::Dragging {
                hover: HoverState::None,
                ..
            }
            | DragState::Idle => DropResolution::Reject { reason: None },
        }
    }

    /// Abort the drag with zero mutations
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Resolve a drop of `source` onto `region`
///
/// Rules for existing nodes:
/// 1. placeholder of a container: nest inside it
/// 2. container node: nest inside it (append)
/// 3. non-container sibling: reorder to its position
/// 4. anything else: reject
pub fn resolve(source: &DragSource, region: &DropRegion, store: &EntityStore) -> StoreResult<DropResolution> {
    match source {
        DragSource::Palette {
            component_type,
            props,
        } => {
            let (page_id, parent_id, index) = match region {
                DropRegion::CanvasRoot { page_id } => {
                    store.check_insert_target(page_id, None)?;
                    (page_id.clone(), None, None)
                }
                DropRegion::Node { node_id } | DropRegion::Placeholder { container_id: node_id } => {
                    let target = accepting(store, node_id)?;
                    (target.page_id.clone(), Some(node_id.clone()), None)
                }
                DropRegion::SiblingSlot {
                    page_id,
                    parent_id,
                    index,
                } => {
                    check_slot(store, page_id, parent_id.as_ref(), *index)?;
                    (page_id.clone(), parent_id.clone(), Some(*index))
                }
            };
            Ok(DropResolution::Create {
                component_type: component_type.clone(),
                props: props.clone(),
                page_id,
                parent_id,
                index,
            })
        }

        DragSource::Existing { node_id } => {
            let dragged = store.get(node_id)?;
            match region {
                DropRegion::CanvasRoot { page_id } => {
                    same_page(dragged, page_id)?;
                    Ok(DropResolution::MoveToRoot {
                        node_id: node_id.clone(),
                        page_id: page_id.clone(),
                        index: None,
                    })
                }

                DropRegion::Placeholder { container_id } => {
                    nest(store, dragged, container_id, None)
                }

                DropRegion::Node { node_id: target_id } => {
                    let target = store.get(target_id)?;
                    same_page(dragged, &target.page_id)?;
                    if target.allow_children {
                        nest(store, dragged, target_id, None)
                    } else if target.parent_id == dragged.parent_id && target_id != node_id {
                        let (parent_id, from) = store.position(node_id)?;
                        let (_, to) = store.position(target_id)?;
                        Ok(DropResolution::ReorderAmongSiblings {
                            page_id: dragged.page_id.clone(),
                            parent_id,
                            from,
                            to,
                        })
                    } else {
                        Err(EditorError::CapabilityDenied(target_id.clone()))
                    }
                }

                DropRegion::SiblingSlot {
                    page_id,
                    parent_id,
                    index,
                } => {
                    same_page(dragged, page_id)?;
                    let len = check_slot(store, page_id, parent_id.as_ref(), *index)?;
                    if *parent_id == dragged.parent_id {
                        // gap index counts the dragged node itself
                        let (_, from) = store.position(node_id)?;
                        let to = if *index > from { *index - 1 } else { *index };
                        return Ok(DropResolution::ReorderAmongSiblings {
                            page_id: page_id.clone(),
                            parent_id: parent_id.clone(),
                            from,
                            to: to.min(len.saturating_sub(1)),
                        });
                    }
                    match parent_id {
                        Some(container_id) => nest(store, dragged, container_id, Some(*index)),
                        None => Ok(DropResolution::MoveToRoot {
                            node_id: node_id.clone(),
                            page_id: page_id.clone(),
                            index: Some(*index),
                        }),
                    }
                }
            }
        }
    }
}

fn accepting<'a>(store: &'a EntityStore, id: &NodeId) -> StoreResult<&'a Node> {
    let node = store.get(id)?;
    if !node.allow_children {
        return Err(EditorError::CapabilityDenied(id.clone()));
    }
    Ok(node)
}

fn same_page(node: &Node, page_id: &PageId) -> StoreResult<()> {
    if &node.page_id != page_id {
        return Err(EditorError::CrossPage {
            node: node.id.clone(),
            expected: node.page_id.clone(),
            actual: page_id.clone(),
        });
    }
    Ok(())
}

/// Validate a sibling gap, returning the sibling count
fn check_slot(store: &EntityStore, page_id: &PageId, parent_id: Option<&NodeId>, index: usize) -> StoreResult<usize> {
    store.check_insert_target(page_id, parent_id)?;
    let len = store.sibling_ids(page_id, parent_id)?.len();
    if index > len {
        return Err(EditorError::IndexOutOfRange { index, len });
    }
    Ok(len)
}

fn nest(
    store: &EntityStore,
    dragged: &Node,
    container_id: &NodeId,
    index: Option<usize>,
) -> StoreResult<DropResolution> {
    let container = accepting(store, container_id)?;
    same_page(dragged, &container.page_id)?;
    if store.is_ancestor(&dragged.id, container_id) {
        return Err(EditorError::CycleRejected {
            node: dragged.id.clone(),
            target: container_id.clone(),
        });
    }
    Ok(DropResolution::InsertIntoContainer {
        node_id: dragged.id.clone(),
        container_id: container_id.clone(),
        index,
    })
}
