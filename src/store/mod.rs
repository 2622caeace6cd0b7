// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! The live document store.
//!
//! The store owns all nodes and edges exclusively and is the only shared
//! mutable state in the engine. Mutations are synchronous; subscribers
//! receive the full current collection on every mutation, strictly ordered
//! per collection, over unbounded channels.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::model::{
    EdgeData, EdgeId, GraphEdge, GraphNode, NodeData, NodeDataPatch, NodeId, NodeKind, Side,
};

const NEW_NODE_LABEL: &str = "New note";

/// A change notification carrying the full collection after the mutation.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Nodes(Vec<GraphNode>),
    Edges(Vec<GraphEdge>),
}

/// A pending edge connection; `source`/`target` are not validated against
/// existing nodes (deferred to the consuming layer).
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    pub from_side: Option<Side>,
    pub to_side: Option<Side>,
}

impl Connection {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            from_side: None,
            to_side: None,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    subscribers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl StoreInner {
    fn publish(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn publish_nodes(&mut self) {
        let nodes = self.nodes.clone();
        self.publish(StoreEvent::Nodes(nodes));
    }

    fn publish_edges(&mut self) {
        let edges = self.edges.clone();
        self.publish(StoreEvent::Edges(edges));
    }
}

/// Clonable handle to the document store.
///
/// Constructed explicitly and passed to collaborators; there is no
/// process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("document store lock poisoned")
    }

    /// Registers a subscriber; it receives every subsequent mutation.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }

    /// Creates a text node at `(x, y)` with a fresh collision-resistant id
    /// and the default data bag, and returns it.
    pub fn create_node(&self, x: f64, y: f64) -> GraphNode {
        let node = GraphNode::new(
            NodeId::generate("node"),
            NodeKind::Text,
            x,
            y,
            NodeData {
                label: NEW_NODE_LABEL.to_owned(),
                text: Some(NEW_NODE_LABEL.to_owned()),
                ..NodeData::default()
            },
        );

        let mut inner = self.lock();
        inner.nodes.push(node.clone());
        inner.publish_nodes();
        node
    }

    /// Removes the given nodes and every edge referencing them.
    ///
    /// Both removals happen in one critical section; the edge notification is
    /// published first so no subscriber ever observes a dangling edge.
    pub fn delete_nodes(&self, ids: &[NodeId]) {
        let mut inner = self.lock();
        let edges_before = inner.edges.len();
        let nodes_before = inner.nodes.len();

        inner
            .edges
            .retain(|edge| !ids.contains(&edge.source) && !ids.contains(&edge.target));
        inner.nodes.retain(|node| !ids.contains(&node.id));

        if inner.edges.len() != edges_before {
            inner.publish_edges();
        }
        if inner.nodes.len() != nodes_before {
            inner.publish_nodes();
        }
    }

    /// Merges `patch` into the node's data bag.
    ///
    /// A missing id is a silent no-op: deletion racing an update is expected
    /// and must not error.
    pub fn update_node_data(&self, id: &NodeId, patch: NodeDataPatch) {
        let mut inner = self.lock();
        let Some(node) = inner.nodes.iter_mut().find(|node| &node.id == id) else {
            return;
        };
        node.apply_data(patch);
        inner.publish_nodes();
    }

    /// Appends an edge with a fresh id; referential validity is not checked.
    pub fn add_edge(&self, connection: Connection) -> GraphEdge {
        let edge = GraphEdge::new(
            EdgeId::generate("edge"),
            connection.source,
            connection.target,
            EdgeData {
                from_side: connection.from_side,
                to_side: connection.to_side,
                ..EdgeData::default()
            },
        );

        let mut inner = self.lock();
        inner.edges.push(edge.clone());
        inner.publish_edges();
        edge
    }

    /// Wholesale replacement, used when the host delivers a new document.
    pub fn replace(&self, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) {
        let mut inner = self.lock();
        inner.nodes = nodes;
        inner.edges = edges;
        inner.publish_nodes();
        inner.publish_edges();
    }

    /// A consistent copy of both collections.
    pub fn snapshot(&self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let inner = self.lock();
        (inner.nodes.clone(), inner.edges.clone())
    }

    pub fn node(&self, id: &NodeId) -> Option<GraphNode> {
        self.lock().nodes.iter().find(|node| &node.id == id).cloned()
    }
}
