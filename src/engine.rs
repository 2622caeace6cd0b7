// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! Engine composition.
//!
//! Wires the document store, synchronization task, file node manager and the
//! incoming-message dispatcher together, and owns the `ready` handshake. The
//! embedding feeds host messages in through [`CanvasEngine::deliver`] (or the
//! cloned inbound sender) and receives engine messages through whatever
//! [`HostChannel`] it injected.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::file::FileNodeManager;
use crate::host::{EngineMessage, HostChannel, HostMessage};
use crate::store::DocumentStore;
use crate::sync::SyncEngine;

/// A running canvas engine session.
pub struct CanvasEngine {
    store: DocumentStore,
    files: FileNodeManager,
    inbound: mpsc::UnboundedSender<HostMessage>,
    api_key: watch::Receiver<Option<String>>,
}

impl CanvasEngine {
    /// Builds the session, spawns its tasks and announces readiness.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(host: Arc<dyn HostChannel>) -> Self {
        let store = DocumentStore::new();
        let files = FileNodeManager::new(store.clone(), host.clone());

        let (inbound, inbound_rx) = mpsc::unbounded_channel();
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();
        let (api_key_tx, api_key) = watch::channel(None);

        let sync = SyncEngine::new(store.clone(), host.clone(), loads_rx);
        tokio::spawn(sync.run());
        tokio::spawn(dispatch(inbound_rx, files.clone(), loads_tx, api_key_tx));

        host.send(EngineMessage::Ready);

        Self {
            store,
            files,
            inbound,
            api_key,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn files(&self) -> &FileNodeManager {
        &self.files
    }

    /// A clonable sender for incoming host messages.
    pub fn inbound(&self) -> mpsc::UnboundedSender<HostMessage> {
        self.inbound.clone()
    }

    /// Delivers one host message to the dispatcher.
    pub fn deliver(&self, message: HostMessage) {
        if self.inbound.send(message).is_err() {
            tracing::warn!("dispatcher gone; dropping incoming message");
        }
    }

    /// The most recently delivered API key, if any; consumed outside the
    /// sync core.
    pub fn api_key(&self) -> watch::Receiver<Option<String>> {
        self.api_key.clone()
    }
}

/// Routes incoming host messages: document loads to the sync task, file
/// responses to the pending-request table, configuration to its slot.
async fn dispatch(
    mut inbound: mpsc::UnboundedReceiver<HostMessage>,
    files: FileNodeManager,
    loads: mpsc::UnboundedSender<String>,
    api_key: watch::Sender<Option<String>>,
) {
    while let Some(message) = inbound.recv().await {
        match message {
            HostMessage::LoadContent { content } => {
                if loads.send(content).is_err() {
                    tracing::warn!("sync task gone; dropping loadContent");
                }
            }
            HostMessage::FileContentLoaded { node_id, content } => {
                files.resolve_loaded(&node_id, content);
            }
            HostMessage::FileContentError { node_id, error } => {
                files.resolve_error(&node_id, error);
            }
            HostMessage::FileContentSaved { node_id } => {
                files.resolve_saved(&node_id);
            }
            HostMessage::GroqApiKey { key } => {
                let _ = api_key.send(Some(key));
            }
        }
    }
}
