// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

use rstest::rstest;

use super::{
    dangling_edges, parse_document, serialize_document, to_internal, to_persisted, CanvasDocument,
    CanvasEdge, CanvasNode,
};
use crate::model::{NodeKind, Side};

fn text_node(id: &str, text: &str) -> CanvasNode {
    CanvasNode {
        id: id.into(),
        x: 0.0,
        y: 0.0,
        width: None,
        height: None,
        kind: NodeKind::Text,
        text: Some(text.to_owned()),
        file: None,
        color: None,
    }
}

fn edge(id: &str, from: &str, to: &str) -> CanvasEdge {
    CanvasEdge {
        id: id.into(),
        from_node: from.into(),
        from_side: None,
        to_node: to.into(),
        to_side: None,
        color: None,
        label: None,
    }
}

#[test]
fn round_trip_is_stable_after_one_normalization_pass() {
    let document = CanvasDocument {
        nodes: vec![
            text_node("a", "alpha"),
            CanvasNode {
                id: "b".into(),
                x: 10.0,
                y: 20.0,
                width: Some(300.0),
                height: Some(120.0),
                kind: NodeKind::File,
                text: None,
                file: Some("notes/b.md".to_owned()),
                color: Some("#ff0000".to_owned()),
            },
        ],
        edges: vec![CanvasEdge {
            from_side: Some(Side::Bottom),
            label: Some("links".to_owned()),
            ..edge("e1", "a", "b")
        }],
    };

    let (nodes, edges) = to_internal(&document);
    let normalized = to_persisted(&nodes, &edges);

    let (nodes2, edges2) = to_internal(&normalized);
    let normalized_again = to_persisted(&nodes2, &edges2);
    assert_eq!(normalized, normalized_again);

    // Explicit values survive verbatim; only absent ones were filled in.
    assert_eq!(normalized.nodes[1].width, Some(300.0));
    assert_eq!(normalized.nodes[1].height, Some(120.0));
    assert_eq!(normalized.edges[0].from_side, Some(Side::Bottom));
    assert_eq!(normalized.edges[0].to_side, Some(Side::Left));
}

#[test]
fn save_injects_node_size_defaults() {
    let document = CanvasDocument {
        nodes: vec![text_node("a", "alpha")],
        edges: Vec::new(),
    };
    let (nodes, edges) = to_internal(&document);

    // Load carries absence through untouched.
    assert_eq!(nodes[0].data.width, None);
    assert_eq!(nodes[0].data.height, None);

    let persisted = to_persisted(&nodes, &edges);
    assert_eq!(persisted.nodes[0].width, Some(250.0));
    assert_eq!(persisted.nodes[0].height, Some(60.0));
}

#[test]
fn save_defaults_edge_sides_but_load_preserves_absence() {
    let document = CanvasDocument {
        nodes: vec![text_node("a", "alpha"), text_node("b", "beta")],
        edges: vec![edge("e1", "a", "b")],
    };
    let (nodes, edges) = to_internal(&document);
    assert_eq!(edges[0].data.from_side, None);
    assert_eq!(edges[0].data.to_side, None);

    let persisted = to_persisted(&nodes, &edges);
    assert_eq!(persisted.edges[0].from_side, Some(Side::Right));
    assert_eq!(persisted.edges[0].to_side, Some(Side::Left));
}

#[rstest]
#[case(r#"{"id":"n","x":0,"y":0,"type":"text","text":"t"}"#, NodeKind::Text)]
#[case(r#"{"id":"n","x":0,"y":0,"type":"file","file":"f.md"}"#, NodeKind::File)]
#[case(r#"{"id":"n","x":0,"y":0,"type":"group"}"#, NodeKind::Text)]
#[case(r#"{"id":"n","x":0,"y":0,"type":"link"}"#, NodeKind::Text)]
fn anything_but_file_loads_as_text(#[case] json: &str, #[case] expected: NodeKind) {
    let node: CanvasNode = serde_json::from_str(json).expect("node json");
    assert_eq!(node.kind, expected);
}

#[test]
fn label_derives_from_text_then_file_then_empty() {
    let mut file_node = text_node("a", "ignored");
    file_node.text = None;
    file_node.file = Some("doc.md".to_owned());

    let mut bare_node = text_node("b", "ignored");
    bare_node.text = None;

    let document = CanvasDocument {
        nodes: vec![text_node("t", "hello"), file_node, bare_node],
        edges: Vec::new(),
    };
    let (nodes, _) = to_internal(&document);

    assert_eq!(nodes[0].data.label, "hello");
    assert_eq!(nodes[1].data.label, "doc.md");
    assert_eq!(nodes[2].data.label, "");
}

#[test]
fn scenario_single_text_node() {
    let document =
        parse_document(r#"{"nodes":[{"id":"a","x":0,"y":0,"type":"text","text":"hi"}],"edges":[]}"#)
            .expect("well-formed document");

    let (nodes, edges) = to_internal(&document);
    assert_eq!(nodes[0].data.label, "hi");
    assert_eq!(nodes[0].data.width, None);

    let persisted = to_persisted(&nodes, &edges);
    assert_eq!(persisted.nodes[0].width, Some(250.0));
    assert_eq!(persisted.nodes[0].height, Some(60.0));
    assert_eq!(persisted.nodes[0].text.as_deref(), Some("hi"));
    assert_eq!(persisted.nodes[0].file, None);
}

#[test]
fn wire_shape_uses_camel_case_edge_fields_and_omits_absent_options() {
    let document = CanvasDocument {
        nodes: vec![text_node("a", "alpha"), text_node("b", "beta")],
        edges: vec![edge("e1", "a", "b")],
    };
    let (nodes, edges) = to_internal(&document);
    let json = serialize_document(&to_persisted(&nodes, &edges)).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    let edge = &value["edges"][0];
    assert_eq!(edge["fromNode"], "a");
    assert_eq!(edge["toNode"], "b");
    assert_eq!(edge["fromSide"], "right");
    assert_eq!(edge["toSide"], "left");
    assert!(edge.get("color").is_none());
    assert!(edge.get("label").is_none());

    let node = &value["nodes"][0];
    assert_eq!(node["type"], "text");
    assert!(node.get("file").is_none());
    assert!(node.get("color").is_none());
}

#[test]
fn parse_tolerates_missing_collections() {
    let document = parse_document("{}").expect("empty document");
    assert!(document.nodes.is_empty());
    assert!(document.edges.is_empty());
}

#[test]
fn dangling_edges_are_detected_not_repaired() {
    let document = CanvasDocument {
        nodes: vec![text_node("a", "alpha"), text_node("b", "beta")],
        edges: vec![edge("ok", "a", "b"), edge("broken", "a", "missing")],
    };
    let (nodes, edges) = to_internal(&document);

    let dangling = dangling_edges(&nodes, &edges);
    assert_eq!(dangling, vec!["broken".into()]);
    // Nothing was removed.
    assert_eq!(edges.len(), 2);
}
