//! # Editor
//!
//! The single editing context of a running application. It owns the entity
//! store and everything that mutates it (undo history, drag machine), plus
//! the global UI state the core cares about (current page, breakpoint,
//! selection, pending notifications).
//!
//! Every public operation is tolerant: a rejected operation leaves the state
//! untouched, records a [`Diagnostic`] and reports failure through its return
//! value. Nothing here panics on bad input.

use crate::config::EditorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::drag::{DragController, DragSource, DropRegion, DropResolution, HoverState};
use crate::errors::EditorError;
use crate::ids::{NodeId, PageId};
use crate::mutations::Mutation;
use crate::node::{Node, Page};
use crate::project::ProjectSnapshot;
use crate::registry::ComponentRegistry;
use crate::responsive::{merge_props, Breakpoint, Props};
use crate::store::EntityStore;
use crate::undo_stack::UndoStack;

pub struct Editor {
    name: String,
    store: EntityStore,
    registry: ComponentRegistry,
    history: UndoStack,
    drag: DragController,
    diagnostics: Diagnostics,
    breakpoint: Breakpoint,
    current_page: Option<PageId>,
}

impl Editor {
    /// Create an editor for a new project with one empty page
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &EditorConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: &EditorConfig) -> Self {
        let name = name.into();
        let mut store = EntityStore::new(&name);
        let home = store.add_page("Home");
        let mut editor = Self::from_parts(name, store, config);
        editor.current_page = Some(home);
        editor
    }

    /// Open an existing project
    pub fn from_snapshot(snapshot: ProjectSnapshot, config: &EditorConfig) -> Self {
        Self::from_parts(snapshot.name, snapshot.store, config)
    }

    fn from_parts(name: String, store: EntityStore, config: &EditorConfig) -> Self {
        let current_page = store.pages().first().map(|p| p.id.clone());
        tracing::info!(project = %name, pages = store.pages().len(), nodes = store.len(), "editor opened");
        Self {
            name,
            store,
            registry: config.registry(),
            history: UndoStack::with_max_levels(config.undo_levels),
            drag: DragController::new(),
            diagnostics: Diagnostics::with_capacity(config.max_diagnostics),
            breakpoint: config.default_breakpoint,
            current_page,
        }
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot::new(self.name.clone(), self.store.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the tree
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    // ---- global UI state -----------------------------------------------

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) {
        self.breakpoint = breakpoint;
    }

    pub fn current_page(&self) -> Option<&PageId> {
        self.current_page.as_ref()
    }

    pub fn set_current_page(&mut self, page_id: &PageId) -> bool {
        if self.store.page(page_id).is_none() {
            self.diagnostics
                .report("setCurrentPage", &EditorError::PageNotFound(page_id.clone()));
            return false;
        }
        self.current_page = Some(page_id.clone());
        true
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.store.selected()
    }

    pub fn select(&mut self, id: Option<&NodeId>) -> bool {
        match self.store.select(id) {
            Ok(()) => true,
            Err(err) => {
                self.diagnostics.report("select", &err);
                false
            }
        }
    }

    // ---- notifications -------------------------------------------------

    /// Drain pending notifications
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.peek()
    }

    // ---- reads ---------------------------------------------------------

    pub fn pages(&self) -> &[Page] {
        self.store.pages()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.store.node(id)
    }

    pub fn children(&self, id: &NodeId) -> Vec<&Node> {
        self.store.children(id).unwrap_or_default()
    }

    pub fn roots(&self, page_id: &PageId) -> Vec<&Node> {
        self.store.roots(page_id).unwrap_or_default()
    }

    /// Effective props at the current breakpoint
    pub fn effective_props(&self, id: &NodeId) -> Option<Props> {
        self.effective_props_at(id, self.breakpoint)
    }

    pub fn effective_props_at(&self, id: &NodeId, breakpoint: Breakpoint) -> Option<Props> {
        self.store.effective_props(id, breakpoint).ok()
    }

    // ---- mutations -----------------------------------------------------

    /// Apply a raw mutation through the undo history
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        self.run(mutation.name(), mutation)
    }

    fn run(&mut self, operation: &str, mutation: Mutation) -> bool {
        match self.history.apply(&mutation, &mut self.store) {
            Ok(()) => true,
            Err(err) => {
                self.diagnostics.report(operation, &err);
                false
            }
        }
    }

    pub fn add_page(&mut self, name: impl Into<String>) -> Option<PageId> {
        let page_id = self.store.next_page_id();
        let mutation = Mutation::AddPage {
            page_id: page_id.clone(),
            name: name.into(),
            index: None,
        };
        self.run("addPage", mutation).then_some(page_id)
    }

    pub fn rename_page(&mut self, page_id: &PageId, name: impl Into<String>) -> bool {
        self.run(
            "renamePage",
            Mutation::RenamePage {
                page_id: page_id.clone(),
                name: name.into(),
            },
        )
    }

    /// Delete a page and all of its nodes
    pub fn remove_page(&mut self, page_id: &PageId) -> bool {
        let removed = self.run(
            "removePage",
            Mutation::RemovePage {
                page_id: page_id.clone(),
            },
        );
        if removed && self.current_page.as_ref() == Some(page_id) {
            self.current_page = self.store.pages().first().map(|p| p.id.clone());
        }
        removed
    }

    /// Create a node of a registered type
    ///
    /// `props` is merged over the type's default props; whether the node
    /// accepts children comes from the registry.
    pub fn add_node(
        &mut self,
        component_type: &str,
        props: Props,
        parent_id: Option<&NodeId>,
        page_id: &PageId,
    ) -> Option<NodeId> {
        self.insert_node(component_type, props, parent_id, page_id, None)
    }

    pub fn insert_node(
        &mut self,
        component_type: &str,
        props: Props,
        parent_id: Option<&NodeId>,
        page_id: &PageId,
        index: Option<usize>,
    ) -> Option<NodeId> {
        let Some(spec) = self.registry.get(component_type) else {
            self.diagnostics.report(
                "addNode",
                &EditorError::UnknownComponentType(component_type.to_string()),
            );
            return None;
        };

        let mut merged = spec.default_props.clone();
        merge_props(&mut merged, &props);
        let allow_children = spec.can_have_children;

        // a rejected insert must not consume an id
        let ids = self.store.ids.clone();
        let node_id = self.store.next_node_id();
        let mutation = Mutation::AddNode {
            node_id: node_id.clone(),
            page_id: page_id.clone(),
            parent_id: parent_id.cloned(),
            index,
            component_type: component_type.to_string(),
            props: merged,
            allow_children,
        };
        if self.run("addNode", mutation) {
            Some(node_id)
        } else {
            self.store.ids = ids;
            None
        }
    }

    /// Palette click: append a new node to `target` (default: current page root)
    pub fn add_from_palette(&mut self, component_type: &str, target: Option<&NodeId>) -> Option<NodeId> {
        let page_id = match target {
            Some(target) => match self.store.get(target) {
                Ok(node) => node.page_id.clone(),
                Err(err) => {
                    self.diagnostics.report("addFromPalette", &err);
                    return None;
                }
            },
            None => self.current_page.clone()?,
        };

        self.create_and_select("addFromPalette", component_type, Props::new(), target, &page_id, None)
    }

    /// Create a node and select it, as a single undo step
    fn create_and_select(
        &mut self,
        operation: &str,
        component_type: &str,
        props: Props,
        parent_id: Option<&NodeId>,
        page_id: &PageId,
        index: Option<usize>,
    ) -> Option<NodeId> {
        self.history.begin_batch();
        let created = self
            .insert_node(component_type, props, parent_id, page_id, index)
            .filter(|id| {
                let select = Mutation::Select {
                    node_id: Some(id.clone()),
                };
                self.run(operation, select)
            });

        match created {
            Some(id) => {
                self.history.set_batch_description(format!("Add {}", component_type));
                self.history.end_batch();
                Some(id)
            }
            None => {
                if let Err(err) = self.history.abort_batch(&mut self.store) {
                    self.diagnostics.report(operation, &err);
                }
                None
            }
        }
    }

    /// Cascading delete
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        self.run("removeNode", Mutation::RemoveNode { node_id: id.clone() })
    }

    pub fn update_props(&mut self, id: &NodeId, partial: Props) -> bool {
        self.run(
            "updateProps",
            Mutation::UpdateProps {
                node_id: id.clone(),
                props: partial,
            },
        )
    }

    pub fn update_responsive_props(&mut self, id: &NodeId, breakpoint: Breakpoint, partial: Props) -> bool {
        self.run(
            "updateResponsiveProps",
            Mutation::UpdateResponsiveProps {
                node_id: id.clone(),
                breakpoint,
                props: partial,
            },
        )
    }

    pub fn reorder_siblings(&mut self, page_id: &PageId, parent_id: Option<&NodeId>, from: usize, to: usize) -> bool {
        if from == to {
            // still reject out-of-range indices
            return match self.store.reorder_siblings(page_id, parent_id, from, to) {
                Ok(()) => true,
                Err(err) => {
                    self.diagnostics.report("reorderSiblings", &err);
                    false
                }
            };
        }
        self.run(
            "reorderSiblings",
            Mutation::ReorderSiblings {
                page_id: page_id.clone(),
                parent_id: parent_id.cloned(),
                from,
                to,
            },
        )
    }

    pub fn reparent(&mut self, id: &NodeId, new_parent_id: Option<&NodeId>, index: Option<usize>) -> bool {
        self.run(
            "reparent",
            Mutation::Reparent {
                node_id: id.clone(),
                new_parent_id: new_parent_id.cloned(),
                index,
            },
        )
    }

    // ---- history -------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.store) {
            Ok(done) => done,
            Err(err) => {
                self.diagnostics.report("undo", &err);
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.store) {
            Ok(done) => done,
            Err(err) => {
                self.diagnostics.report("redo", &err);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- drag & drop ---------------------------------------------------

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn begin_drag(&mut self, source: DragSource) -> bool {
        self.drag.begin(source)
    }

    pub fn drag_over(&mut self, region: DropRegion) -> Option<&HoverState> {
        self.drag.hover(region, &self.store)
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Finish the drag, applying its resolution. Returns whether the tree changed.
    pub fn drop(&mut self) -> bool {
        let resolution = self.drag.drop(&self.store);
        tracing::debug!(?resolution, "drop resolved");

        match resolution {
            DropResolution::Create {
                component_type,
                props,
                page_id,
                parent_id,
                index,
            } => self
                .create_and_select("drop", &component_type, props, parent_id.as_ref(), &page_id, index)
                .is_some(),
            DropResolution::InsertIntoContainer {
                node_id,
                container_id,
                index,
            } => self.reparent(&node_id, Some(&container_id), index),
            DropResolution::ReorderAmongSiblings {
                page_id,
                parent_id,
                from,
                to,
            } => from != to && self.reorder_siblings(&page_id, parent_id.as_ref(), from, to),
            DropResolution::MoveToRoot { node_id, index, .. } => self.reparent(&node_id, None, index),
            DropResolution::Reject { reason } => {
                if let Some(reason) = reason {
                    self.diagnostics.report("drop", &reason);
                }
                false
            }
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("name", &self.name)
            .field("pages", &self.store.pages().len())
            .field("nodes", &self.store.len())
            .field("breakpoint", &self.breakpoint)
            .field("undo_levels", &self.history.undo_levels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    fn home(editor: &Editor) -> PageId {
        editor.current_page().cloned().unwrap()
    }

    #[test]
    fn test_new_editor_has_home_page() {
        let editor = Editor::new("site");
        assert_eq!(editor.pages().len(), 1);
        assert_eq!(editor.pages()[0].name, "Home");
        assert_eq!(editor.breakpoint(), Breakpoint::Desktop);
    }

    #[test]
    fn test_add_node_uses_registry_defaults() {
        let mut editor = Editor::new("site");
        let page = home(&editor);

        let id = editor
            .add_node("Heading", props(json!({ "text": "Welcome" })), None, &page)
            .unwrap();

        let node = editor.node(&id).unwrap();
        assert_eq!(node.props["text"], json!("Welcome"));
        assert_eq!(node.props["level"], json!(1));
        assert!(!node.allow_children);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let mut editor = Editor::new("site");
        let page = home(&editor);

        assert!(editor.add_node("Marquee", Props::new(), None, &page).is_none());

        let diagnostics = editor.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "unknown-component-type");
    }

    #[test]
    fn test_rejections_are_noops_with_diagnostics() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let c = editor.add_node("Heading", Props::new(), None, &page).unwrap();
        let d = editor.add_node("Paragraph", Props::new(), None, &page).unwrap();
        let before = editor.store().clone();

        assert!(!editor.reparent(&d, Some(&c), None));
        assert!(!editor.reorder_siblings(&page, None, 0, 5));
        assert!(!editor.update_props(&NodeId::new("ghost"), Props::new()));
        assert!(editor.add_node("Heading", Props::new(), Some(&c), &page).is_none());

        assert_eq!(editor.store(), &before);
        let codes: Vec<_> = editor.take_diagnostics().into_iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                "capability-denied",
                "index-out-of-range",
                "reference-not-found",
                "capability-denied"
            ]
        );
    }

    #[test]
    fn test_reorder_same_index_is_not_recorded() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        editor.add_node("Heading", Props::new(), None, &page).unwrap();
        let levels = editor.history().undo_levels();

        assert!(editor.reorder_siblings(&page, None, 0, 0));
        assert_eq!(editor.history().undo_levels(), levels);
    }

    #[test]
    fn test_palette_click_appends_to_page_root_and_selects() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let first = editor.add_from_palette("Section", None).unwrap();
        let second = editor.add_from_palette("Heading", Some(&first)).unwrap();

        assert_eq!(editor.roots(&page).len(), 1);
        assert_eq!(editor.children(&first)[0].id, second);
        assert_eq!(editor.selected(), Some(&second));
    }

    #[test]
    fn test_palette_add_and_selection_undo_together() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
        editor.select(Some(&section));
        let levels = editor.history().undo_levels();

        let heading = editor.add_from_palette("Heading", Some(&section)).unwrap();
        assert_eq!(editor.history().undo_levels(), levels + 1);
        assert_eq!(editor.history().undo_description(), Some("Add Heading"));

        assert!(editor.undo());
        assert!(editor.node(&heading).is_none());
        assert_eq!(editor.selected(), Some(&section));

        assert!(editor.redo());
        assert!(editor.node(&heading).is_some());
        assert_eq!(editor.selected(), Some(&heading));
    }

    #[test]
    fn test_rejected_palette_add_leaves_no_history() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let image = editor.add_node("Image", Props::new(), None, &page).unwrap();
        let before = editor.store().clone();
        let levels = editor.history().undo_levels();

        assert!(editor.add_from_palette("Heading", Some(&image)).is_none());

        assert_eq!(editor.store(), &before);
        assert_eq!(editor.history().undo_levels(), levels);
        assert_eq!(editor.take_diagnostics()[0].code, "capability-denied");
    }

    #[test]
    fn test_remove_current_page_moves_to_next() {
        let mut editor = Editor::new("site");
        let home_page = home(&editor);
        let about = editor.add_page("About").unwrap();

        assert!(editor.remove_page(&home_page));
        assert_eq!(editor.current_page(), Some(&about));

        assert!(editor.undo());
        assert_eq!(editor.pages()[0].id, home_page);
    }

    #[test]
    fn test_effective_props_follow_global_breakpoint() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let id = editor
            .add_node("Heading", props(json!({ "color": "#000" })), None, &page)
            .unwrap();
        editor.update_responsive_props(&id, Breakpoint::Mobile, props(json!({ "color": "#fff" })));

        assert_eq!(editor.effective_props(&id).unwrap()["color"], json!("#000"));
        editor.set_breakpoint(Breakpoint::Mobile);
        assert_eq!(editor.effective_props(&id).unwrap()["color"], json!("#fff"));
    }

    #[test]
    fn test_palette_drag_creates_and_selects() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let section = editor.add_node("Section", Props::new(), None, &page).unwrap();

        editor.begin_drag(DragSource::Palette {
            component_type: "Button".to_string(),
            props: props(json!({ "label": "Buy" })),
        });
        editor.drag_over(DropRegion::Placeholder {
            container_id: section.clone(),
        });
        assert!(editor.drop());

        let children = editor.children(&section);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].props["label"], json!("Buy"));
        assert_eq!(editor.selected(), Some(&children[0].id));
    }

    #[test]
    fn test_invalid_drop_reports_and_leaves_tree() {
        let mut editor = Editor::new("site");
        let page = home(&editor);
        let heading = editor.add_node("Heading", Props::new(), None, &page).unwrap();
        let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
        let inner = editor.add_node("Paragraph", Props::new(), Some(&section), &page).unwrap();
        let before = editor.store().clone();

        editor.begin_drag(DragSource::Existing { node_id: heading });
        editor.drag_over(DropRegion::Node { node_id: inner });
        assert!(!editor.drop());

        assert_eq!(editor.store(), &before);
        assert_eq!(editor.take_diagnostics()[0].code, "capability-denied");
        assert!(!editor.drag().is_dragging());
    }
}
