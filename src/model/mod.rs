// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! Core data model: typed ids and the in-memory canvas graph.
//!
//! The graph is the live, editable shape; the persisted shape lives in
//! [`crate::format`].

pub mod graph;
pub mod ids;

pub use graph::{
    EdgeData, GraphEdge, GraphNode, NodeData, NodeDataPatch, NodeKind, Side, DEFAULT_NODE_HEIGHT,
    DEFAULT_NODE_WIDTH,
};
pub use ids::{EdgeId, Id, NodeId, RequestId};
