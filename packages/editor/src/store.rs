//! # Entity Store
//!
//! Normalized, page-scoped component tree.
//!
//! ```text
//! pages:  [Page]                      (page order)
//! roots:  PageId → [NodeId]           (root order per page)
//! nodes:  NodeId → Node               (children = sibling order)
//! ```
//!
//! Every method validates before it touches state, so a returned error
//! always means nothing changed. The tolerant "no-op with diagnostic"
//! policy lives one level up, in [`crate::Editor`].

use crate::errors::EditorError;
use crate::ids::{IdGenerator, NodeId, PageId};
use crate::node::{Node, Page};
use crate::responsive::{merge_props, Breakpoint, Props};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub type StoreResult<T> = Result<T, EditorError>;

/// A subtree detached by [`EntityStore::remove_node`], sufficient to restore it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedSubtree {
    pub root: NodeId,
    pub page_id: PageId,
    pub parent_id: Option<NodeId>,
    /// Former index among its siblings
    pub index: usize,
    /// Subtree nodes, root first (pre-order)
    pub nodes: Vec<Node>,
    /// Set when the selection pointed into the subtree
    pub selected: Option<NodeId>,
}

/// A page detached by [`EntityStore::remove_page`], with all of its nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedPage {
    pub page: Page,
    pub index: usize,
    pub roots: Vec<NodeId>,
    pub nodes: Vec<Node>,
    pub selected: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStore {
    pub(crate) ids: IdGenerator,
    pub(crate) pages: Vec<Page>,
    pub(crate) roots: BTreeMap<PageId, Vec<NodeId>>,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    #[serde(default)]
    pub(crate) selected: Option<NodeId>,
}

impl EntityStore {
    pub fn new(project_name: &str) -> Self {
        Self {
            ids: IdGenerator::new(project_name),
            ..Self::default()
        }
    }

    // ---- pages ---------------------------------------------------------

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    fn require_page(&self, id: &PageId) -> StoreResult<&Page> {
        self.page(id).ok_or_else(|| EditorError::PageNotFound(id.clone()))
    }

    /// Fresh page id; ids already in use are skipped
    pub fn next_page_id(&mut self) -> PageId {
        loop {
            let id = self.ids.next_page_id();
            if self.page(&id).is_none() {
                return id;
            }
        }
    }

    /// Create a page at the end of the page list
    pub fn add_page(&mut self, name: impl Into<String>) -> PageId {
        let id = self.next_page_id();
        self.pages.push(Page {
            id: id.clone(),
            name: name.into(),
        });
        self.roots.insert(id.clone(), Vec::new());
        id
    }

    /// Insert a page with a known id at `index` (clamped)
    pub fn insert_page(&mut self, page: Page, index: usize) -> StoreResult<()> {
        if self.page(&page.id).is_some() {
            return Err(EditorError::Integrity(format!("page {} already exists", page.id)));
        }
        let index = index.min(self.pages.len());
        self.roots.insert(page.id.clone(), Vec::new());
        self.pages.insert(index, page);
        Ok(())
    }

    /// Rename a page, returning its previous name
    pub fn rename_page(&mut self, id: &PageId, name: impl Into<String>) -> StoreResult<String> {
        let page = self
            .pages
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| EditorError::PageNotFound(id.clone()))?;
        Ok(std::mem::replace(&mut page.name, name.into()))
    }

    /// Capture a page and every node it owns, without removing anything
    pub fn snapshot_page(&self, id: &PageId) -> StoreResult<RemovedPage> {
        let index = self
            .pages
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| EditorError::PageNotFound(id.clone()))?;
        let nodes: Vec<Node> = self
            .nodes
            .values()
            .filter(|n| &n.page_id == id)
            .cloned()
            .collect();
        let selected = self
            .selected
            .as_ref()
            .filter(|s| nodes.iter().any(|n| &n.id == *s))
            .cloned();

        Ok(RemovedPage {
            page: self.pages[index].clone(),
            index,
            roots: self.roots.get(id).cloned().unwrap_or_default(),
            nodes,
            selected,
        })
    }

    /// Remove a page and every node it owns
    pub fn remove_page(&mut self, id: &PageId) -> StoreResult<RemovedPage> {
        let removed = self.snapshot_page(id)?;

        for node in &removed.nodes {
            self.nodes.remove(&node.id);
        }
        if removed.selected.is_some() {
            self.selected = None;
        }
        self.roots.remove(id);
        self.pages.remove(removed.index);

        tracing::debug!(page = %id, removed = removed.nodes.len(), "page removed");
        Ok(removed)
    }

    /// Put back a page removed by [`EntityStore::remove_page`]
    pub fn restore_page(&mut self, removed: RemovedPage) -> StoreResult<()> {
        if let Some(clash) = removed.nodes.iter().find(|n| self.nodes.contains_key(&n.id)) {
            return Err(EditorError::DuplicateNode(clash.id.clone()));
        }
        let page_id = removed.page.id.clone();
        self.insert_page(removed.page, removed.index)?;
        self.roots.insert(page_id, removed.roots);
        for node in removed.nodes {
            self.nodes.insert(node.id.clone(), node);
        }
        if self.selected.is_none() {
            self.selected = removed.selected;
        }
        Ok(())
    }

    // ---- reads ---------------------------------------------------------

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get(&self, id: &NodeId) -> StoreResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| EditorError::ReferenceNotFound(id.clone()))
    }

    pub(crate) fn get_mut(&mut self, id: &NodeId) -> StoreResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| EditorError::ReferenceNotFound(id.clone()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Children of `id` in authoritative order. Dangling ids are skipped.
    pub fn children(&self, id: &NodeId) -> StoreResult<Vec<&Node>> {
        let node = self.get(id)?;
        Ok(node.children.iter().filter_map(|c| self.nodes.get(c)).collect())
    }

    /// Root-level nodes of a page in root order
    pub fn roots(&self, page_id: &PageId) -> StoreResult<Vec<&Node>> {
        Ok(self
            .root_ids(page_id)?
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect())
    }

    pub fn root_ids(&self, page_id: &PageId) -> StoreResult<&[NodeId]> {
        self.require_page(page_id)?;
        Ok(self.roots.get(page_id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Ordered sibling list: a node's children, or the page root list
    pub fn sibling_ids(&self, page_id: &PageId, parent_id: Option<&NodeId>) -> StoreResult<&[NodeId]> {
        match parent_id {
            Some(parent_id) => {
                let parent = self.get(parent_id)?;
                if &parent.page_id != page_id {
                    return Err(EditorError::CrossPage {
                        node: parent_id.clone(),
                        expected: parent.page_id.clone(),
                        actual: page_id.clone(),
                    });
                }
                Ok(&parent.children)
            }
            None => self.root_ids(page_id),
        }
    }

    pub(crate) fn siblings_mut(
        &mut self,
        page_id: &PageId,
        parent_id: Option<&NodeId>,
    ) -> StoreResult<&mut Vec<NodeId>> {
        match parent_id {
            Some(parent_id) => Ok(&mut self.get_mut(parent_id)?.children),
            None => {
                self.require_page(page_id)?;
                Ok(self.roots.entry(page_id.clone()).or_default())
            }
        }
    }

    /// Current placement of a node: (parent, index among siblings)
    pub fn position(&self, id: &NodeId) -> StoreResult<(Option<NodeId>, usize)> {
        let node = self.get(id)?;
        let siblings = self.sibling_ids(&node.page_id, node.parent_id.as_ref())?;
        let index = siblings.iter().position(|s| s == id).ok_or_else(|| {
            EditorError::Integrity(format!("{} missing from its sibling list", id))
        })?;
        Ok((node.parent_id.clone(), index))
    }

    /// All descendants of `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: &NodeId) -> StoreResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.get(id)?.children.iter().rev().collect();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(next) {
                out.push(next.clone());
                stack.extend(node.children.iter().rev());
            }
        }
        Ok(out)
    }

    /// Whether `ancestor` lies on the parent chain of `node` (or is `node`)
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(node);
        // bounded walk, a corrupt chain must not hang the UI
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.nodes.get(id).and_then(|n| n.parent_id.as_ref()),
                None => return false,
            }
        }
        false
    }

    pub fn effective_props(&self, id: &NodeId, breakpoint: Breakpoint) -> StoreResult<Props> {
        Ok(self.get(id)?.effective_props(breakpoint))
    }

    // ---- node lifecycle -----------------------------------------------

    /// Fresh node id; ids already in use are skipped
    pub fn next_node_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_node_id();
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Advance the id generator past every page and node id in the store
    pub fn sync_ids(&mut self) {
        let pages = self.pages.iter().map(|p| p.id.as_str());
        let nodes = self.nodes.keys().map(NodeId::as_str);
        self.ids.advance_past(pages.chain(nodes));
    }

    /// Create a node at the end of `parent_id`'s children (or the page roots)
    pub fn add_node(
        &mut self,
        component_type: &str,
        props: Props,
        allow_children: bool,
        parent_id: Option<&NodeId>,
        page_id: &PageId,
    ) -> StoreResult<NodeId> {
        self.check_insert_target(page_id, parent_id)?;
        let id = self.next_node_id();
        let mut node = Node::new(id, page_id.clone(), component_type, props, allow_children);
        node.parent_id = parent_id.cloned();
        self.insert_node(node, None)
    }

    /// Insert a fully-formed node at `index` (clamped, default end)
    ///
    /// The node's `parent_id` and `page_id` decide where it goes; its
    /// `children` must be empty.
    pub fn insert_node(&mut self, mut node: Node, index: Option<usize>) -> StoreResult<NodeId> {
        if self.nodes.contains_key(&node.id) {
            return Err(EditorError::DuplicateNode(node.id));
        }
        self.check_insert_target(&node.page_id, node.parent_id.as_ref())?;
        node.children.clear();

        let id = node.id.clone();
        let page_id = node.page_id.clone();
        let parent_id = node.parent_id.clone();
        let siblings = self.siblings_mut(&page_id, parent_id.as_ref())?;
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, id.clone());
        self.nodes.insert(id.clone(), node);

        tracing::debug!(node = %id, parent = ?parent_id, index, "node inserted");
        Ok(id)
    }

    /// Validate that a new child may be placed under `parent_id` on `page_id`
    pub(crate) fn check_insert_target(&self, page_id: &PageId, parent_id: Option<&NodeId>) -> StoreResult<()> {
        self.require_page(page_id)?;
        if let Some(parent_id) = parent_id {
            let parent = self.get(parent_id)?;
            if &parent.page_id != page_id {
                return Err(EditorError::CrossPage {
                    node: parent_id.clone(),
                    expected: parent.page_id.clone(),
                    actual: page_id.clone(),
                });
            }
            if !parent.allow_children {
                return Err(EditorError::CapabilityDenied(parent_id.clone()));
            }
        }
        Ok(())
    }

    /// Capture `id` and its subtree with its placement, without removing anything
    pub fn snapshot_subtree(&self, id: &NodeId) -> StoreResult<RemovedSubtree> {
        let (parent_id, index) = self.position(id)?;
        let page_id = self.get(id)?.page_id.clone();

        let mut ids = vec![id.clone()];
        ids.extend(self.descendants(id)?);

        let selected = self
            .selected
            .as_ref()
            .filter(|s| ids.contains(s))
            .cloned();
        let nodes = ids.iter().filter_map(|n| self.nodes.get(n)).cloned().collect();

        Ok(RemovedSubtree {
            root: id.clone(),
            page_id,
            parent_id,
            index,
            nodes,
            selected,
        })
    }

    /// Cascading delete of `id` and its whole subtree
    pub fn remove_node(&mut self, id: &NodeId) -> StoreResult<RemovedSubtree> {
        let removed = self.snapshot_subtree(id)?;

        self.siblings_mut(&removed.page_id, removed.parent_id.as_ref())?
            .remove(removed.index);
        for node in &removed.nodes {
            self.nodes.remove(&node.id);
        }
        if removed.selected.is_some() {
            self.selected = None;
        }

        tracing::debug!(node = %id, removed = removed.nodes.len(), "subtree removed");
        Ok(removed)
    }

    /// Put back a subtree removed by [`EntityStore::remove_node`]
    pub fn restore_subtree(&mut self, subtree: RemovedSubtree) -> StoreResult<()> {
        self.check_insert_target(&subtree.page_id, subtree.parent_id.as_ref())?;
        if let Some(clash) = subtree.nodes.iter().find(|n| self.nodes.contains_key(&n.id)) {
            return Err(EditorError::DuplicateNode(clash.id.clone()));
        }

        let siblings = self.siblings_mut(&subtree.page_id, subtree.parent_id.as_ref())?;
        let index = subtree.index.min(siblings.len());
        siblings.insert(index, subtree.root.clone());
        for node in subtree.nodes {
            self.nodes.insert(node.id.clone(), node);
        }
        if self.selected.is_none() {
            self.selected = subtree.selected;
        }
        Ok(())
    }

    // ---- properties ----------------------------------------------------

    /// Shallow-merge into base props, returning the previous props
    pub fn update_props(&mut self, id: &NodeId, partial: &Props) -> StoreResult<Props> {
        let node = self.get_mut(id)?;
        let previous = node.props.clone();
        merge_props(&mut node.props, partial);
        Ok(previous)
    }

    pub fn replace_props(&mut self, id: &NodeId, props: Props) -> StoreResult<Props> {
        let node = self.get_mut(id)?;
        Ok(std::mem::replace(&mut node.props, props))
    }

    /// Shallow-merge into one breakpoint's overrides, returning the previous map
    pub fn update_responsive_props(
        &mut self,
        id: &NodeId,
        breakpoint: Breakpoint,
        partial: &Props,
    ) -> StoreResult<Props> {
        let overrides = self.get_mut(id)?.responsive_props.get_mut(breakpoint);
        let previous = overrides.clone();
        merge_props(overrides, partial);
        Ok(previous)
    }

    pub fn replace_responsive_props(
        &mut self,
        id: &NodeId,
        breakpoint: Breakpoint,
        props: Props,
    ) -> StoreResult<Props> {
        let overrides = self.get_mut(id)?.responsive_props.get_mut(breakpoint);
        Ok(std::mem::replace(overrides, props))
    }

    // ---- selection -----------------------------------------------------

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Select a live node (or clear the selection)
    pub fn select(&mut self, id: Option<&NodeId>) -> StoreResult<()> {
        if let Some(id) = id {
            self.get(id)?;
        }
        self.selected = id.cloned();
        Ok(())
    }

    // ---- integrity -----------------------------------------------------

    /// Verify the structural invariants, reporting the first violation
    pub fn check_integrity(&self) -> StoreResult<()> {
        let fail = |msg: String| Err(EditorError::Integrity(msg));

        for node in self.nodes.values() {
            if self.page(&node.page_id).is_none() {
                return fail(format!("{} references missing page {}", node.id, node.page_id));
            }

            let siblings = match &node.parent_id {
                Some(parent_id) => match self.nodes.get(parent_id) {
                    Some(parent) if parent.page_id != node.page_id => {
                        return fail(format!("{} and parent {} on different pages", node.id, parent_id));
                    }
                    Some(parent) => &parent.children,
                    None => return fail(format!("{} has missing parent {}", node.id, parent_id)),
                },
                None => match self.roots.get(&node.page_id) {
                    Some(roots) => roots,
                    None => return fail(format!("page {} has no root list", node.page_id)),
                },
            };
            if siblings.iter().filter(|s| *s == &node.id).count() != 1 {
                return fail(format!("{} not listed exactly once among its siblings", node.id));
            }

            let mut seen = HashSet::new();
            for child in &node.children {
                if !seen.insert(child) {
                    return fail(format!("{} lists child {} twice", node.id, child));
                }
                match self.nodes.get(child) {
                    Some(c) if c.parent_id.as_ref() == Some(&node.id) => {}
                    _ => return fail(format!("{} lists stray child {}", node.id, child)),
                }
            }

            if let Some(parent_id) = &node.parent_id {
                if self.is_ancestor(&node.id, parent_id) {
                    return fail(format!("{} is its own ancestor", node.id));
                }
            }
        }

        for (page_id, roots) in &self.roots {
            let mut seen = HashSet::new();
            for root in roots {
                if !seen.insert(root) {
                    return fail(format!("root {} listed twice on {}", root, page_id));
                }
                match self.nodes.get(root) {
                    Some(n) if n.parent_id.is_none() && &n.page_id == page_id => {}
                    _ => return fail(format!("stray root {} on {}", root, page_id)),
                }
            }
        }

        if let Some(selected) = &self.selected {
            if !self.nodes.contains_key(selected) {
                return fail(format!("selection {} is not a live node", selected));
            }
        }

        Ok(())
    }
}
