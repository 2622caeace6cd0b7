// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! The canonical persisted canvas format and the bidirectional converter.
//!
//! Both directions are pure and total: no I/O, no side effects, no error
//! paths for well-formed input. Defaults are injected only at the save
//! boundary (`to_persisted`), so a load/save pair normalizes a document once
//! and is a fixed point afterwards.

use serde::{Deserialize, Serialize};

use crate::model::{
    EdgeData, EdgeId, GraphEdge, GraphNode, NodeData, NodeId, NodeKind, Side, DEFAULT_NODE_HEIGHT,
    DEFAULT_NODE_WIDTH,
};

/// The persisted document root, written atomically on each save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    #[serde(default)]
    pub nodes: Vec<CanvasNode>,
    #[serde(default)]
    pub edges: Vec<CanvasEdge>,
}

/// A node in persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An edge in persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasEdge {
    pub id: EdgeId,
    pub from_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_side: Option<Side>,
    pub to_node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Maps a persisted document to the in-memory graph shape.
///
/// `label` is derived as `text`, else `file`, else empty; width/height/color
/// carry through unchanged, including absence. Edge sides are preserved as
/// loaded (no defaulting happens here).
pub fn to_internal(document: &CanvasDocument) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let nodes = document
        .nodes
        .iter()
        .map(|node| {
            let label = node
                .text
                .clone()
                .or_else(|| node.file.clone())
                .unwrap_or_default();
            GraphNode::new(
                node.id.clone(),
                node.kind,
                node.x,
                node.y,
                NodeData {
                    label,
                    text: node.text.clone(),
                    file: node.file.clone(),
                    width: node.width,
                    height: node.height,
                    color: node.color.clone(),
                },
            )
        })
        .collect();

    let edges = document
        .edges
        .iter()
        .map(|edge| {
            GraphEdge::new(
                edge.id.clone(),
                edge.from_node.clone(),
                edge.to_node.clone(),
                EdgeData {
                    from_side: edge.from_side,
                    to_side: edge.to_side,
                    color: edge.color.clone(),
                    label: edge.label.clone(),
                },
            )
        })
        .collect();

    (nodes, edges)
}

/// Maps the in-memory graph back to persisted form, injecting defaults.
///
/// Nodes without a size get 250x60. `text` is written only for non-file nodes
/// (falling back to `label` when `text` is absent); `file` only for file
/// nodes. Edges without sides get `right`/`left`.
pub fn to_persisted(nodes: &[GraphNode], edges: &[GraphEdge]) -> CanvasDocument {
    let nodes = nodes
        .iter()
        .map(|node| {
            let is_file = node.kind == NodeKind::File;
            CanvasNode {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                width: Some(node.data.width.unwrap_or(DEFAULT_NODE_WIDTH)),
                height: Some(node.data.height.unwrap_or(DEFAULT_NODE_HEIGHT)),
                kind: node.kind,
                text: if is_file {
                    None
                } else {
                    Some(
                        node.data
                            .text
                            .clone()
                            .unwrap_or_else(|| node.data.label.clone()),
                    )
                },
                file: if is_file { node.data.file.clone() } else { None },
                color: node.data.color.clone(),
            }
        })
        .collect();

    let edges = edges
        .iter()
        .map(|edge| CanvasEdge {
            id: edge.id.clone(),
            from_node: edge.source.clone(),
            from_side: Some(edge.data.from_side.unwrap_or(Side::Right)),
            to_node: edge.target.clone(),
            to_side: Some(edge.data.to_side.unwrap_or(Side::Left)),
            color: edge.data.color.clone(),
            label: edge.data.label.clone(),
        })
        .collect();

    CanvasDocument { nodes, edges }
}

/// Parses the on-disk JSON form of a document.
pub fn parse_document(json: &str) -> Result<CanvasDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serializes a document to its on-disk JSON form.
pub fn serialize_document(document: &CanvasDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Returns the ids of edges referencing a node that does not exist.
///
/// Inconsistencies are detected, never repaired; the caller decides how to
/// surface them.
pub fn dangling_edges(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<EdgeId> {
    let ids = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<std::collections::BTreeSet<_>>();

    edges
        .iter()
        .filter(|edge| !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()))
        .map(|edge| edge.id.clone())
        .collect()
}

#[cfg(test)]
mod tests;
