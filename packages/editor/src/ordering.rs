//! # Ordering & Reparenting
//!
//! Moves nodes between parents and reorders siblings.
//!
//! ## Semantics
//!
//! ### Reorder
//! - Array move within one sibling list (page roots or a node's children)
//! - `from == to` is a no-op
//! - Either index outside the list fails with `IndexOutOfRange`
//!
//! ### Reparent
//! - Target must exist, live on the same page and accept children
//! - Target may not be the node or one of its descendants
//! - Insert index is clamped; `None` appends
//! - All checks run before the node is detached

use crate::errors::EditorError;
use crate::ids::{NodeId, PageId};
use crate::store::{EntityStore, StoreResult};

impl EntityStore {
    /// Move the sibling at `from` so that it ends up at `to`
    pub fn reorder_siblings(
        &mut self,
        page_id: &PageId,
        parent_id: Option<&NodeId>,
        from: usize,
        to: usize,
    ) -> StoreResult<()> {
        let len = self.sibling_ids(page_id, parent_id)?.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditorError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let siblings = self.siblings_mut(page_id, parent_id)?;
        let moved = siblings.remove(from);
        siblings.insert(to, moved);

        tracing::debug!(parent = ?parent_id, from, to, "siblings reordered");
        Ok(())
    }

    /// Move `id` under `new_parent_id` (or to the page root list)
    ///
    /// Returns the previous placement `(parent, index)` so the move can be
    /// inverted.
    pub fn reparent(
        &mut self,
        id: &NodeId,
        new_parent_id: Option<&NodeId>,
        index: Option<usize>,
    ) -> StoreResult<(Option<NodeId>, usize)> {
        let page_id = self.get(id)?.page_id.clone();
        self.check_insert_target(&page_id, new_parent_id)?;
        if let Some(target) = new_parent_id {
            if self.is_ancestor(id, target) {
                return Err(EditorError::CycleRejected {
                    node: id.clone(),
                    target: target.clone(),
                });
            }
        }

        let (old_parent, old_index) = self.position(id)?;
        self.siblings_mut(&page_id, old_parent.as_ref())?.remove(old_index);

        let siblings = self.siblings_mut(&page_id, new_parent_id)?;
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, id.clone());
        self.get_mut(id)?.parent_id = new_parent_id.cloned();

        tracing::debug!(node = %id, from = ?old_parent, to = ?new_parent_id, index, "node reparented");
        Ok((old_parent, old_index))
    }
}
