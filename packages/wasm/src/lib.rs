use serde_json::{json, Value};
use trellis_editor::{
    Breakpoint, DragSource, DropRegion, Editor, EditorConfig, HoverState, Mutation, Node, NodeId,
    PageId, ProjectSnapshot, Props,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn parse_props(json: &str) -> Result<Props, String> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(props)) => Ok(props),
        Ok(other) => Err(format!("Props must be an object, got {}", other)),
        Err(e) => Err(format!("Invalid props JSON: {}", e)),
    }
}

fn parse_config(json: Option<String>) -> Result<EditorConfig, String> {
    match json {
        Some(json) => serde_json::from_str(&json).map_err(|e| format!("Invalid config: {}", e)),
        None => Ok(EditorConfig::default()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

/// Serialized subtree handed to the rendering layer
fn render_tree(editor: &Editor, node: &Node) -> Value {
    let children: Vec<Value> = editor
        .children(&node.id)
        .into_iter()
        .map(|child| render_tree(editor, child))
        .collect();

    json!({
        "id": node.id,
        "type": node.component_type,
        "allowChildren": node.allow_children,
        "props": editor.effective_props(&node.id).unwrap_or_default(),
        "children": children,
    })
}

fn hover_json(hover: Option<&HoverState>) -> Value {
    match hover {
        Some(HoverState::Valid { preview, .. }) => json!({ "state": "valid", "preview": preview }),
        Some(HoverState::Invalid { reason, .. }) => json!({
            "state": "invalid",
            "code": reason.code(),
            "message": reason.to_string(),
        }),
        Some(HoverState::None) => json!({ "state": "none" }),
        None => json!({ "state": "idle" }),
    }
}

/// Browser-side handle on one editing session
#[wasm_bindgen]
pub struct EditorHandle {
    editor: Editor,
}

#[wasm_bindgen]
impl EditorHandle {
    /// Start a new project with an empty home page
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str, config: Option<String>) -> Result<EditorHandle, JsValue> {
        let config = parse_config(config).map_err(js_err)?;
        Ok(Self {
            editor: Editor::with_config(name, &config),
        })
    }

    /// Open a saved project snapshot
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(snapshot: &str, config: Option<String>) -> Result<EditorHandle, JsValue> {
        let config = parse_config(config).map_err(js_err)?;
        let snapshot = ProjectSnapshot::from_json(snapshot).map_err(|e| js_err(e.to_string()))?;
        Ok(Self {
            editor: Editor::from_snapshot(snapshot, &config),
        })
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.editor
            .snapshot()
            .to_json()
            .map_err(|e| js_err(e.to_string()))
    }

    // ---- pages ---------------------------------------------------------

    pub fn pages(&self) -> Result<String, JsValue> {
        to_json(&self.editor.pages()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> Option<String> {
        self.editor.current_page().map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = setCurrentPage)]
    pub fn set_current_page(&mut self, page_id: &str) -> bool {
        self.editor.set_current_page(&PageId::new(page_id))
    }

    #[wasm_bindgen(js_name = addPage)]
    pub fn add_page(&mut self, name: &str) -> Option<String> {
        self.editor.add_page(name).map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = renamePage)]
    pub fn rename_page(&mut self, page_id: &str, name: &str) -> bool {
        self.editor.rename_page(&PageId::new(page_id), name)
    }

    #[wasm_bindgen(js_name = removePage)]
    pub fn remove_page(&mut self, page_id: &str) -> bool {
        self.editor.remove_page(&PageId::new(page_id))
    }

    // ---- tree ----------------------------------------------------------

    /// Page tree with effective props at the current breakpoint
    pub fn tree(&self, page_id: &str) -> Result<String, JsValue> {
        let roots: Vec<Value> = self
            .editor
            .roots(&PageId::new(page_id))
            .into_iter()
            .map(|root| render_tree(&self.editor, root))
            .collect();
        to_json(&roots).map_err(js_err)
    }

    /// Raw node record
    pub fn node(&self, id: &str) -> Result<Option<String>, JsValue> {
        self.editor
            .node(&NodeId::new(id))
            .map(to_json)
            .transpose()
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = effectiveProps)]
    pub fn effective_props(&self, id: &str) -> Result<Option<String>, JsValue> {
        self.editor
            .effective_props(&NodeId::new(id))
            .map(|props| to_json(&props))
            .transpose()
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(
        &mut self,
        component_type: &str,
        props: &str,
        parent_id: Option<String>,
        page_id: &str,
    ) -> Result<Option<String>, JsValue> {
        let props = parse_props(props).map_err(js_err)?;
        let parent_id = parent_id.map(NodeId::new);
        Ok(self
            .editor
            .add_node(component_type, props, parent_id.as_ref(), &PageId::new(page_id))
            .map(|id| id.to_string()))
    }

    #[wasm_bindgen(js_name = addFromPalette)]
    pub fn add_from_palette(&mut self, component_type: &str, target: Option<String>) -> Option<String> {
        let target = target.map(NodeId::new);
        self.editor
            .add_from_palette(component_type, target.as_ref())
            .map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.editor.remove_node(&NodeId::new(id))
    }

    #[wasm_bindgen(js_name = updateProps)]
    pub fn update_props(&mut self, id: &str, partial: &str) -> Result<bool, JsValue> {
        let partial = parse_props(partial).map_err(js_err)?;
        Ok(self.editor.update_props(&NodeId::new(id), partial))
    }

    #[wasm_bindgen(js_name = updateResponsiveProps)]
    pub fn update_responsive_props(&mut self, id: &str, breakpoint: &str, partial: &str) -> Result<bool, JsValue> {
        let breakpoint: Breakpoint = breakpoint.parse().map_err(|e| js_err(format!("{}", e)))?;
        let partial = parse_props(partial).map_err(js_err)?;
        Ok(self
            .editor
            .update_responsive_props(&NodeId::new(id), breakpoint, partial))
    }

    pub fn reparent(&mut self, id: &str, new_parent_id: Option<String>, index: Option<u32>) -> bool {
        let new_parent_id = new_parent_id.map(NodeId::new);
        self.editor.reparent(
            &NodeId::new(id),
            new_parent_id.as_ref(),
            index.map(|i| i as usize),
        )
    }

    #[wasm_bindgen(js_name = reorderSiblings)]
    pub fn reorder_siblings(&mut self, page_id: &str, parent_id: Option<String>, from: u32, to: u32) -> bool {
        let parent_id = parent_id.map(NodeId::new);
        self.editor.reorder_siblings(
            &PageId::new(page_id),
            parent_id.as_ref(),
            from as usize,
            to as usize,
        )
    }

    /// Apply one mutation in its JSON form
    #[wasm_bindgen(js_name = applyMutation)]
    pub fn apply_mutation(&mut self, mutation: &str) -> Result<bool, JsValue> {
        let mutation: Mutation =
            serde_json::from_str(mutation).map_err(|e| js_err(format!("Invalid mutation: {}", e)))?;
        Ok(self.editor.apply(mutation))
    }

    // ---- UI state ------------------------------------------------------

    pub fn breakpoint(&self) -> String {
        self.editor.breakpoint().to_string()
    }

    #[wasm_bindgen(js_name = setBreakpoint)]
    pub fn set_breakpoint(&mut self, breakpoint: &str) -> Result<(), JsValue> {
        let breakpoint: Breakpoint = breakpoint.parse().map_err(|e| js_err(format!("{}", e)))?;
        self.editor.set_breakpoint(breakpoint);
        Ok(())
    }

    pub fn selected(&self) -> Option<String> {
        self.editor.selected().map(|id| id.to_string())
    }

    pub fn select(&mut self, id: Option<String>) -> bool {
        let id = id.map(NodeId::new);
        self.editor.select(id.as_ref())
    }

    /// Drain pending notifications as a JSON array
    #[wasm_bindgen(js_name = takeDiagnostics)]
    pub fn take_diagnostics(&mut self) -> Result<String, JsValue> {
        to_json(&self.editor.take_diagnostics()).map_err(js_err)
    }

    // ---- history -------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    #[wasm_bindgen(js_name = undoDescription)]
    pub fn undo_description(&self) -> Option<String> {
        self.editor.history().undo_description().map(str::to_string)
    }

    // ---- drag & drop ---------------------------------------------------

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, source: &str) -> Result<bool, JsValue> {
        let source: DragSource =
            serde_json::from_str(source).map_err(|e| js_err(format!("Invalid drag source: {}", e)))?;
        Ok(self.editor.begin_drag(source))
    }

    /// Returns `{state, preview | code, message}` for the hovered region
    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&mut self, region: &str) -> Result<String, JsValue> {
        let region: DropRegion =
            serde_json::from_str(region).map_err(|e| js_err(format!("Invalid drop region: {}", e)))?;
        let hover = hover_json(self.editor.drag_over(region));
        to_json(&hover).map_err(js_err)
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self) {
        self.editor.drag_leave();
    }

    pub fn drop(&mut self) -> bool {
        self.editor.drop()
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.editor.cancel_drag();
    }
}
