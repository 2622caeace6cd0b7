// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use super::ids::{EdgeId, NodeId};

/// Default node size injected at the save boundary when a node never had an
/// explicit width/height.
pub const DEFAULT_NODE_WIDTH: f64 = 250.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 60.0;

/// The kind of a canvas node.
///
/// The persisted format is permissive here: anything that is not exactly
/// `"file"` loads as `Text`, including unrecognized future kinds, without a
/// warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Text,
    File,
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "file" { Self::File } else { Self::Text })
    }
}

/// The side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// The mutable data bag of a node.
///
/// `label` is a display-oriented mirror of `text` (text nodes) or `file`
/// (file nodes); every mutation path goes through [`GraphNode::apply_data`],
/// which keeps the mirror consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub label: String,
    pub text: Option<String>,
    pub file: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<String>,
}

/// A partial update to a node's data bag; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub text: Option<String>,
    pub file: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<String>,
}

impl NodeDataPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// An in-memory canvas node.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub data: NodeData,
}

impl GraphNode {
    pub fn new(id: NodeId, kind: NodeKind, x: f64, y: f64, data: NodeData) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            data,
        }
    }

    /// Merges `patch` into the data bag and refreshes the `label` mirror.
    pub fn apply_data(&mut self, patch: NodeDataPatch) {
        let NodeDataPatch {
            label,
            text,
            file,
            width,
            height,
            color,
        } = patch;

        if let Some(label) = label {
            self.data.label = label;
        }
        if let Some(text) = text {
            if self.kind != NodeKind::File {
                self.data.label = text.clone();
            }
            self.data.text = Some(text);
        }
        if let Some(file) = file {
            if self.kind == NodeKind::File {
                self.data.label = file.clone();
            }
            self.data.file = Some(file);
        }
        if let Some(width) = width {
            self.data.width = Some(width);
        }
        if let Some(height) = height {
            self.data.height = Some(height);
        }
        if let Some(color) = color {
            self.data.color = Some(color);
        }
    }
}

/// The side-band data bag of an edge.
///
/// Sides stay absent after a load until the next save normalizes them to
/// `right`/`left`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeData {
    pub from_side: Option<Side>,
    pub to_side: Option<Side>,
    pub color: Option<String>,
    pub label: Option<String>,
}

/// An in-memory canvas edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub data: EdgeData,
}

impl GraphEdge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, data: EdgeData) -> Self {
        Self {
            id,
            source,
            target,
            data,
        }
    }
}
