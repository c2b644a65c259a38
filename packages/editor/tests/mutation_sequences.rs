//! Tests for longer mutation sequences against the store
//!
//! This tests:
//! - Move + edit + delete chains
//! - Undo/redo sequences
//! - Batched mutations
//! - Store integrity after operations
//! - Mutation scripts in their JSON form

use serde_json::json;
use trellis_editor::{
    Breakpoint, EditorError, EntityStore, Mutation, NodeId, PageId, Props, UndoStack,
};

fn props(value: serde_json::Value) -> Props {
    value.as_object().cloned().unwrap()
}

fn add(
    stack: &mut UndoStack,
    store: &mut EntityStore,
    id: &str,
    page: &PageId,
    parent: Option<&str>,
    container: bool,
) -> NodeId {
    let node_id = NodeId::new(id);
    stack
        .apply(
            &Mutation::AddNode {
                node_id: node_id.clone(),
                page_id: page.clone(),
                parent_id: parent.map(NodeId::new),
                index: None,
                component_type: if container { "Container" } else { "Paragraph" }.to_string(),
                props: Props::new(),
                allow_children: container,
            },
            store,
        )
        .unwrap();
    node_id
}

fn setup() -> (EntityStore, UndoStack, PageId) {
    let mut store = EntityStore::new("sequences");
    let page = store.add_page("Home");
    (store, UndoStack::new(), page)
}

#[test]
fn test_move_then_delete_sequence() {
    let (mut store, mut stack, page) = setup();
    let root = add(&mut stack, &mut store, "root", &page, None, true);
    let child1 = add(&mut stack, &mut store, "child1", &page, Some("root"), true);
    let child2 = add(&mut stack, &mut store, "child2", &page, Some("root"), false);

    // Move child2 into child1
    stack
        .apply(
            &Mutation::Reparent {
                node_id: child2.clone(),
                new_parent_id: Some(child1.clone()),
                index: Some(0),
            },
            &mut store,
        )
        .unwrap();
    assert_eq!(store.get(&child1).unwrap().children, vec![child2.clone()]);

    // Delete child1 (takes child2 with it)
    stack
        .apply(&Mutation::RemoveNode { node_id: child1.clone() }, &mut store)
        .unwrap();
    assert!(!store.contains(&child1));
    assert!(!store.contains(&child2));
    assert!(store.get(&root).unwrap().children.is_empty());

    // Undo delete restores both
    stack.undo(&mut store).unwrap();
    assert!(store.contains(&child1));
    assert_eq!(store.get(&child2).unwrap().parent_id, Some(child1.clone()));

    // Undo move puts child2 back under root
    stack.undo(&mut store).unwrap();
    assert_eq!(store.get(&root).unwrap().children, vec![child1, child2]);
    store.check_integrity().unwrap();
}

#[test]
fn test_multiple_prop_updates_with_undo_redo() {
    let (mut store, mut stack, page) = setup();
    let text = add(&mut stack, &mut store, "text", &page, None, false);

    for i in 1..=3 {
        stack
            .apply(
                &Mutation::UpdateProps {
                    node_id: text.clone(),
                    props: props(json!({ "text": format!("v{}", i) })),
                },
                &mut store,
            )
            .unwrap();
    }
    assert_eq!(store.get(&text).unwrap().props["text"], json!("v3"));

    stack.undo(&mut store).unwrap();
    stack.undo(&mut store).unwrap();
    assert_eq!(store.get(&text).unwrap().props["text"], json!("v1"));

    stack.undo(&mut store).unwrap();
    assert!(store.get(&text).unwrap().props.get("text").is_none());

    stack.redo(&mut store).unwrap();
    stack.redo(&mut store).unwrap();
    assert_eq!(store.get(&text).unwrap().props["text"], json!("v2"));
}

#[test]
fn test_batched_style_updates() {
    let (mut store, mut stack, page) = setup();
    let box_id = add(&mut stack, &mut store, "box", &page, None, true);
    let levels = stack.undo_levels();

    stack.begin_batch();
    stack
        .apply(
            &Mutation::UpdateProps {
                node_id: box_id.clone(),
                props: props(json!({ "padding": "8px", "gap": "4px" })),
            },
            &mut store,
        )
        .unwrap();
    stack
        .apply(
            &Mutation::UpdateResponsiveProps {
                node_id: box_id.clone(),
                breakpoint: Breakpoint::Mobile,
                props: props(json!({ "padding": "2px" })),
            },
            &mut store,
        )
        .unwrap();
    stack
        .apply(
            &Mutation::UpdateResponsiveProps {
                node_id: box_id.clone(),
                breakpoint: Breakpoint::Tablet,
                props: props(json!({ "gap": "6px" })),
            },
            &mut store,
        )
        .unwrap();
    stack.end_batch();

    assert_eq!(stack.undo_levels(), levels + 1);
    let mobile = store.effective_props(&box_id, Breakpoint::Mobile).unwrap();
    assert_eq!(mobile["padding"], json!("2px"));
    assert_eq!(mobile["gap"], json!("4px"));

    // one undo reverts the whole batch
    stack.undo(&mut store).unwrap();
    let node = store.get(&box_id).unwrap();
    assert!(node.props.is_empty());
    assert!(node.responsive_props.is_empty());
}

#[test]
fn test_insert_and_remove_sequence() {
    let (mut store, mut stack, page) = setup();
    let list = add(&mut stack, &mut store, "list", &page, None, true);
    for id in ["a", "b", "c"] {
        add(&mut stack, &mut store, id, &page, Some("list"), false);
    }

    stack
        .apply(
            &Mutation::ReorderSiblings {
                page_id: page.clone(),
                parent_id: Some(list.clone()),
                from: 2,
                to: 0,
            },
            &mut store,
        )
        .unwrap();
    stack
        .apply(&Mutation::RemoveNode { node_id: NodeId::new("a") }, &mut store)
        .unwrap();

    let order = |store: &EntityStore| -> Vec<String> {
        store
            .get(&list)
            .unwrap()
            .children
            .iter()
            .map(|id| id.to_string())
            .collect()
    };
    assert_eq!(order(&store), vec!["c", "b"]);

    stack.undo(&mut store).unwrap();
    assert_eq!(order(&store), vec!["c", "a", "b"]);
    stack.undo(&mut store).unwrap();
    assert_eq!(order(&store), vec!["a", "b", "c"]);
}

#[test]
fn test_page_removal_round_trip() {
    let (mut store, mut stack, home) = setup();
    add(&mut stack, &mut store, "hero", &home, None, true);
    add(&mut stack, &mut store, "title", &home, Some("hero"), false);

    stack
        .apply(
            &Mutation::AddPage {
                page_id: PageId::new("about"),
                name: "About".to_string(),
                index: None,
            },
            &mut store,
        )
        .unwrap();
    let before = store.clone();

    stack
        .apply(&Mutation::RemovePage { page_id: home.clone() }, &mut store)
        .unwrap();
    assert_eq!(store.pages().len(), 1);
    assert!(store.is_empty());
    assert!(matches!(
        store.root_ids(&home),
        Err(EditorError::PageNotFound(_))
    ));

    stack.undo(&mut store).unwrap();
    assert_eq!(store, before);
}

#[test]
fn test_rejected_step_does_not_break_history() {
    let (mut store, mut stack, page) = setup();
    let outer = add(&mut stack, &mut store, "outer", &page, None, true);
    let inner = add(&mut stack, &mut store, "inner", &page, Some("outer"), true);
    let before = store.clone();

    let err = stack
        .apply(
            &Mutation::Reparent {
                node_id: outer.clone(),
                new_parent_id: Some(inner.clone()),
                index: None,
            },
            &mut store,
        )
        .unwrap_err();

    assert_eq!(err.code(), "cycle-rejected");
    assert_eq!(store, before);
    assert_eq!(stack.undo_levels(), 2);

    stack.undo(&mut store).unwrap();
    assert!(!store.contains(&inner));
}

#[test]
fn test_mutation_script_from_json() {
    let (mut store, mut stack, page) = setup();
    let script = json!([
        {
            "AddNode": {
                "node_id": "hero",
                "page_id": page.as_str(),
                "parent_id": null,
                "index": null,
                "component_type": "Section",
                "props": {},
                "allow_children": true
            }
        },
        {
            "AddNode": {
                "node_id": "cta",
                "page_id": page.as_str(),
                "parent_id": "hero",
                "index": 0,
                "component_type": "Button",
                "props": { "label": "Go" },
                "allow_children": false
            }
        },
        {
            "UpdateResponsiveProps": {
                "node_id": "cta",
                "breakpoint": "mobile",
                "props": { "label": "Tap" }
            }
        }
    ]);

    let mutations: Vec<Mutation> = serde_json::from_value(script).unwrap();
    for mutation in &mutations {
        stack.apply(mutation, &mut store).unwrap();
    }

    let cta = NodeId::new("cta");
    assert_eq!(store.get(&cta).unwrap().parent_id, Some(NodeId::new("hero")));
    assert_eq!(
        store.effective_props(&cta, Breakpoint::Mobile).unwrap()["label"],
        json!("Tap")
    );
    assert_eq!(
        store.effective_props(&cta, Breakpoint::Desktop).unwrap()["label"],
        json!("Go")
    );
}

#[test]
fn test_store_integrity_after_complex_sequence() {
    let (mut store, mut stack, page) = setup();
    let a = add(&mut stack, &mut store, "a", &page, None, true);
    let b = add(&mut stack, &mut store, "b", &page, None, true);
    let c = add(&mut stack, &mut store, "c", &page, Some("a"), true);
    let d = add(&mut stack, &mut store, "d", &page, Some("c"), false);

    let steps = vec![
        Mutation::Reparent {
            node_id: c.clone(),
            new_parent_id: Some(b.clone()),
            index: None,
        },
        Mutation::Reparent {
            node_id: a.clone(),
            new_parent_id: Some(c.clone()),
            index: Some(99),
        },
        Mutation::ReorderSiblings {
            page_id: page.clone(),
            parent_id: Some(c.clone()),
            from: 1,
            to: 0,
        },
        Mutation::RemoveNode { node_id: d.clone() },
    ];

    for step in &steps {
        stack.apply(step, &mut store).unwrap();
        store.check_integrity().unwrap();
    }

    assert_eq!(store.root_ids(&page).unwrap(), &[b.clone()]);
    assert_eq!(store.get(&c).unwrap().children, vec![a.clone()]);
    assert!(store.is_ancestor(&b, &a));

    while stack.undo(&mut store).unwrap() {
        store.check_integrity().unwrap();
    }
    assert!(store.is_empty());
}
