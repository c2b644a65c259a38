//! Integration tests for the editor facade

use serde_json::json;
use trellis_editor::{
    project_seed, Breakpoint, DragSource, DropRegion, Editor, EditorConfig, HoverState, Mutation,
    NodeId, PageId, Props, ProjectSnapshot,
};

fn props(value: serde_json::Value) -> Props {
    value.as_object().cloned().unwrap()
}

fn editor() -> (Editor, PageId) {
    let editor = Editor::new("integration");
    let page = editor.current_page().cloned().unwrap();
    (editor, page)
}

fn root_ids(editor: &Editor, page: &PageId) -> Vec<NodeId> {
    editor.roots(page).into_iter().map(|n| n.id.clone()).collect()
}

#[test]
fn test_reparent_root_into_container() {
    let (mut editor, page) = editor();
    let a = editor.add_node("Container", Props::new(), None, &page).unwrap();
    let b = editor.add_node("Heading", Props::new(), None, &page).unwrap();

    assert!(editor.reparent(&b, Some(&a), None));

    assert_eq!(editor.node(&a).unwrap().children, vec![b.clone()]);
    assert_eq!(editor.node(&b).unwrap().parent_id, Some(a.clone()));
    assert_eq!(root_ids(&editor, &page), vec![a]);
}

#[test]
fn test_reorder_roots() {
    let (mut editor, page) = editor();
    let x = editor.add_node("Heading", Props::new(), None, &page).unwrap();
    let y = editor.add_node("Paragraph", Props::new(), None, &page).unwrap();
    let z = editor.add_node("Button", Props::new(), None, &page).unwrap();

    assert!(editor.reorder_siblings(&page, None, 0, 2));

    assert_eq!(root_ids(&editor, &page), vec![y, z, x]);
}

#[test]
fn test_reparent_into_leaf_is_rejected() {
    let (mut editor, page) = editor();
    let c = editor.add_node("Image", Props::new(), None, &page).unwrap();
    let d = editor.add_node("Heading", Props::new(), None, &page).unwrap();

    assert!(!editor.reparent(&d, Some(&c), None));

    assert_eq!(editor.node(&d).unwrap().parent_id, None);
    let diagnostics = editor.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "capability-denied");
}

#[test]
fn test_mobile_override_only_applies_on_mobile() {
    let (mut editor, page) = editor();
    let n = editor
        .add_node("Paragraph", props(json!({ "color": "#111" })), None, &page)
        .unwrap();

    assert!(editor.update_responsive_props(&n, Breakpoint::Mobile, props(json!({ "color": "#fff" }))));

    let mobile = editor.effective_props_at(&n, Breakpoint::Mobile).unwrap();
    let desktop = editor.effective_props_at(&n, Breakpoint::Desktop).unwrap();
    assert_eq!(mobile["color"], json!("#fff"));
    assert_eq!(desktop["color"], json!("#111"));
    assert_eq!(editor.node(&n).unwrap().props["color"], json!("#111"));
}

#[test]
fn test_cascading_delete_clears_selection() {
    let (mut editor, page) = editor();
    let p = editor.add_node("Section", Props::new(), None, &page).unwrap();
    let q = editor.add_node("Container", Props::new(), Some(&p), &page).unwrap();
    let r = editor.add_node("Heading", Props::new(), Some(&q), &page).unwrap();
    assert!(editor.select(Some(&r)));

    assert!(editor.remove_node(&p));

    for id in [&p, &q, &r] {
        assert!(editor.node(id).is_none());
    }
    assert_eq!(editor.selected(), None);
    assert!(editor.store().check_integrity().is_ok());

    assert!(editor.undo());
    assert_eq!(editor.node(&q).unwrap().children, vec![r.clone()]);
    assert_eq!(editor.selected(), Some(&r));
}

#[test]
fn test_cycle_is_rejected() {
    let (mut editor, page) = editor();
    let outer = editor.add_node("Section", Props::new(), None, &page).unwrap();
    let inner = editor.add_node("Container", Props::new(), Some(&outer), &page).unwrap();

    assert!(!editor.reparent(&outer, Some(&inner), None));
    assert!(!editor.reparent(&outer, Some(&outer), None));

    assert!(editor.node(&outer).unwrap().is_root());
    let codes: Vec<_> = editor.take_diagnostics().into_iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["cycle-rejected", "cycle-rejected"]);
}

#[test]
fn test_undo_redo_walk() {
    let (mut editor, page) = editor();
    let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
    let heading = editor
        .add_node("Heading", props(json!({ "text": "Hello" })), None, &page)
        .unwrap();
    editor.reparent(&heading, Some(&section), None);
    editor.update_props(&heading, props(json!({ "text": "Hi" })));

    assert_eq!(editor.history().undo_description(), Some("Edit text"));

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.node(&heading).unwrap().is_root());
    assert_eq!(editor.node(&heading).unwrap().props["text"], json!("Hello"));

    assert!(editor.redo());
    assert!(editor.redo());
    assert!(!editor.redo());
    assert_eq!(editor.node(&heading).unwrap().parent_id, Some(section));
    assert_eq!(editor.node(&heading).unwrap().props["text"], json!("Hi"));
}

#[test]
fn test_drag_existing_node_between_containers() {
    let (mut editor, page) = editor();
    let left = editor.add_node("Container", Props::new(), None, &page).unwrap();
    let right = editor.add_node("Container", Props::new(), None, &page).unwrap();
    let button = editor.add_node("Button", Props::new(), Some(&left), &page).unwrap();

    assert!(editor.begin_drag(DragSource::Existing {
        node_id: button.clone()
    }));
    let hover = editor
        .drag_over(DropRegion::Placeholder {
            container_id: right.clone(),
        })
        .cloned();
    assert!(matches!(hover, Some(HoverState::Valid { .. })));
    assert!(editor.drop());

    assert!(editor.node(&left).unwrap().children.is_empty());
    assert_eq!(editor.node(&right).unwrap().children, vec![button.clone()]);

    assert!(editor.undo());
    assert_eq!(editor.node(&left).unwrap().children, vec![button]);
}

#[test]
fn test_drag_onto_sibling_reorders() {
    let (mut editor, page) = editor();
    let a = editor.add_node("Heading", Props::new(), None, &page).unwrap();
    let b = editor.add_node("Paragraph", Props::new(), None, &page).unwrap();
    let c = editor.add_node("Button", Props::new(), None, &page).unwrap();

    editor.begin_drag(DragSource::Existing { node_id: a.clone() });
    editor.drag_over(DropRegion::Node { node_id: c.clone() });
    assert!(editor.drop());

    assert_eq!(root_ids(&editor, &page), vec![b, c, a]);
}

#[test]
fn test_cancelled_drag_changes_nothing() {
    let (mut editor, page) = editor();
    let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
    let before = editor.store().clone();
    let levels = editor.history().undo_levels();

    editor.begin_drag(DragSource::Palette {
        component_type: "Heading".to_string(),
        props: Props::new(),
    });
    editor.drag_over(DropRegion::Node { node_id: section });
    editor.cancel_drag();

    assert!(!editor.drop());
    assert_eq!(editor.store(), &before);
    assert_eq!(editor.history().undo_levels(), levels);
    assert!(editor.take_diagnostics().is_empty());
}

#[test]
fn test_snapshot_reopens_with_config() -> anyhow::Result<()> {
    let (mut editor, page) = editor();
    let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
    editor.add_node("Heading", Props::new(), Some(&section), &page).unwrap();

    let json = editor.snapshot().to_json()?;
    let snapshot = ProjectSnapshot::from_json(&json)?;

    let config: EditorConfig = serde_json::from_str(r#"{ "defaultBreakpoint": "tablet" }"#)?;
    let mut reopened = Editor::from_snapshot(snapshot, &config);

    assert_eq!(reopened.breakpoint(), Breakpoint::Tablet);
    assert_eq!(reopened.store(), editor.store());
    assert!(!reopened.can_undo());

    // ids keep counting from the saved generator
    let next = reopened.add_node("Divider", Props::new(), None, &page).unwrap();
    assert!(editor.node(&next).is_none());
    Ok(())
}

#[test]
fn test_generated_ids_skip_ids_taken_by_raw_mutations() {
    let mut editor = Editor::new("site");
    let page = editor.current_page().cloned().unwrap();
    // the home page took counter 1, so this is the next id the generator would issue
    let taken = NodeId::new(format!("{}-2", project_seed("site")));
    assert!(editor.apply(Mutation::AddNode {
        node_id: taken.clone(),
        page_id: page.clone(),
        parent_id: None,
        index: None,
        component_type: "Section".to_string(),
        props: Props::new(),
        allow_children: true,
    }));

    let added: Vec<_> = (0..5)
        .filter_map(|_| editor.add_node("Heading", Props::new(), None, &page))
        .collect();

    assert_eq!(added.len(), 5);
    assert!(!added.contains(&taken));
    assert!(editor.take_diagnostics().is_empty());
    assert_eq!(editor.roots(&page).len(), 6);
}
