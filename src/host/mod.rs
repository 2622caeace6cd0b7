// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! The host ⇄ engine message protocol.
//!
//! Pure message shapes and the injected channel seam; correlation and
//! business logic live in [`crate::file`] and [`crate::sync`]. Every message
//! is a tagged JSON object `{"type": ..., ...fields}` exchanged over an
//! opaque bidirectional channel. Delivery order within one direction is
//! preserved; there is no ordering guarantee across directions.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::model::NodeId;

/// Messages the host sends to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    /// Full document replace.
    LoadContent { content: String },
    /// Success response to a `loadFile` request.
    FileContentLoaded { node_id: NodeId, content: String },
    /// Failure response to a `loadFile` request.
    FileContentError { node_id: NodeId, error: String },
    /// Acknowledgment of a `saveFile` request.
    FileContentSaved { node_id: NodeId },
    /// Configuration delivery; consumed outside the sync core.
    GroqApiKey { key: String },
}

impl HostMessage {
    pub fn decode(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Messages the engine sends to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineMessage {
    /// Startup handshake.
    Ready,
    /// Persist the current document; fire-and-forget.
    Save { content: String },
    /// Request the content of an external file backing a node.
    LoadFile { file_path: String, node_id: NodeId },
    /// Persist the content of an external file backing a node.
    SaveFile {
        file_path: String,
        content: String,
        node_id: NodeId,
    },
}

impl EngineMessage {
    pub fn decode(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The outbound half of the host bridge, injected at construction.
///
/// Sending is fire-and-forget; implementations surface delivery problems
/// through logging, never through the caller.
pub trait HostChannel: Send + Sync + 'static {
    fn send(&self, message: EngineMessage);
}

/// A channel-backed host: outgoing messages land in an mpsc receiver held by
/// the embedding (or a test).
#[derive(Debug, Clone)]
pub struct ChannelHost {
    outgoing: mpsc::UnboundedSender<EngineMessage>,
}

impl ChannelHost {
    pub fn new(outgoing: mpsc::UnboundedSender<EngineMessage>) -> Self {
        Self { outgoing }
    }

    pub fn pair() -> (Self, mpsc::UnboundedReceiver<EngineMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl HostChannel for ChannelHost {
    fn send(&self, message: EngineMessage) {
        if self.outgoing.send(message).is_err() {
            tracing::warn!("host channel closed; dropping outgoing message");
        }
    }
}

/// A host that discards everything; for standalone operation and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HostChannel for NullHost {
    fn send(&self, _message: EngineMessage) {}
}
