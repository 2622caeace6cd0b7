// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! File-backed node management.
//!
//! For nodes whose content lives in an external file, this module issues
//! correlated load/save requests through the host channel and tracks the
//! per-node request lifecycle. Every call registers a per-call request id in
//! a pending table; a single dispatcher routes incoming responses to the
//! oldest matching entry, so overlapping calls for the same node resolve in
//! issue order instead of cross-resolving. Completion or timeout removes the
//! entry, whichever comes first.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::host::{EngineMessage, HostChannel};
use crate::model::{NodeDataPatch, NodeId, RequestId};
use crate::store::DocumentStore;

/// How long a correlated request waits for a host response.
pub const FILE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-node display state for a file-backed node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeActivity {
    #[default]
    Viewing,
    Loading,
    Editing,
    /// Failure with the host-reported reason retained for display.
    Error(String),
}

/// A correlated request that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRequestError {
    /// No matching response within [`FILE_REQUEST_TIMEOUT`].
    TimedOut { node_id: NodeId },
    /// The host reported a failure (file not found, access error, ...).
    Rejected { node_id: NodeId, reason: String },
    /// The manager went away while the request was in flight.
    Disconnected { node_id: NodeId },
}

impl fmt::Display for FileRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut { node_id } => {
                write!(f, "file request for node {node_id} timed out")
            }
            Self::Rejected { node_id, reason } => {
                write!(f, "file request for node {node_id} failed: {reason}")
            }
            Self::Disconnected { node_id } => {
                write!(f, "file request for node {node_id} lost its channel")
            }
        }
    }
}

impl std::error::Error for FileRequestError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RequestKind {
    Load,
    Save,
}

#[derive(Debug)]
struct Pending {
    request_id: RequestId,
    reply: oneshot::Sender<Result<String, String>>,
}

#[derive(Debug, Default)]
struct FileInner {
    pending: HashMap<(NodeId, RequestKind), VecDeque<Pending>>,
    activity: HashMap<NodeId, NodeActivity>,
}

/// Clonable handle to the file node manager.
#[derive(Clone)]
pub struct FileNodeManager {
    store: DocumentStore,
    host: Arc<dyn HostChannel>,
    inner: Arc<Mutex<FileInner>>,
}

impl FileNodeManager {
    pub fn new(store: DocumentStore, host: Arc<dyn HostChannel>) -> Self {
        Self {
            store,
            host,
            inner: Arc::new(Mutex::new(FileInner::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FileInner> {
        self.inner.lock().expect("file manager lock poisoned")
    }

    pub fn activity(&self, node_id: &NodeId) -> NodeActivity {
        self.lock().activity.get(node_id).cloned().unwrap_or_default()
    }

    fn set_activity(&self, node_id: &NodeId, activity: NodeActivity) {
        self.lock().activity.insert(node_id.clone(), activity);
    }

    pub fn is_editing(&self, node_id: &NodeId) -> bool {
        self.activity(node_id) == NodeActivity::Editing
    }

    /// Enters edit mode; reloads are frozen until [`Self::end_edit`].
    /// Double activation is tolerated.
    pub fn begin_edit(&self, node_id: &NodeId) {
        self.set_activity(node_id, NodeActivity::Editing);
    }

    pub fn end_edit(&self, node_id: &NodeId) {
        self.set_activity(node_id, NodeActivity::Viewing);
    }

    /// Requests the external file content backing `node_id`.
    ///
    /// Returns `Ok(None)` without issuing a request while the node is being
    /// edited, so an external load never clobbers in-progress edits. On
    /// success the fetched content is written into the document store and
    /// returned.
    pub async fn load_file(
        &self,
        node_id: &NodeId,
        file_path: &str,
    ) -> Result<Option<String>, FileRequestError> {
        if self.is_editing(node_id) {
            tracing::debug!(node = %node_id, "reload skipped while editing");
            return Ok(None);
        }

        self.set_activity(node_id, NodeActivity::Loading);
        let message = EngineMessage::LoadFile {
            file_path: file_path.to_owned(),
            node_id: node_id.clone(),
        };

        match self.request(node_id, RequestKind::Load, message).await {
            Ok(content) => {
                self.store
                    .update_node_data(node_id, NodeDataPatch::text(content.clone()));
                self.set_activity(node_id, NodeActivity::Viewing);
                Ok(Some(content))
            }
            Err(err) => {
                self.set_activity(node_id, NodeActivity::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Persists `content` to the external file backing `node_id`, awaiting
    /// the host's acknowledgment with the same correlation and timeout
    /// discipline as loads.
    pub async fn save_file(
        &self,
        node_id: &NodeId,
        file_path: &str,
        content: &str,
    ) -> Result<(), FileRequestError> {
        let message = EngineMessage::SaveFile {
            file_path: file_path.to_owned(),
            content: content.to_owned(),
            node_id: node_id.clone(),
        };

        match self.request(node_id, RequestKind::Save, message).await {
            Ok(_) => {
                if matches!(self.activity(node_id), NodeActivity::Error(_)) {
                    self.set_activity(node_id, NodeActivity::Viewing);
                }
                Ok(())
            }
            Err(err) => {
                if !self.is_editing(node_id) {
                    self.set_activity(node_id, NodeActivity::Error(err.to_string()));
                }
                Err(err)
            }
        }
    }

    /// Applies an in-editor content update: mirrors it into the store and
    /// persists it to the backing file. File content travels independently of
    /// the document-level debounce channel.
    pub async fn update_content(
        &self,
        node_id: &NodeId,
        file_path: &str,
        content: &str,
    ) -> Result<(), FileRequestError> {
        self.store
            .update_node_data(node_id, NodeDataPatch::text(content));
        self.save_file(node_id, file_path, content).await
    }

    async fn request(
        &self,
        node_id: &NodeId,
        kind: RequestKind,
        message: EngineMessage,
    ) -> Result<String, FileRequestError> {
        let (tx, rx) = oneshot::channel();
        let request_id = RequestId::generate("req");
        {
            let mut inner = self.lock();
            inner
                .pending
                .entry((node_id.clone(), kind))
                .or_default()
                .push_back(Pending {
                    request_id: request_id.clone(),
                    reply: tx,
                });
        }

        self.host.send(message);

        match tokio::time::timeout(FILE_REQUEST_TIMEOUT, rx).await {
            Ok(Ok(Ok(content))) => Ok(content),
            Ok(Ok(Err(reason))) => Err(FileRequestError::Rejected {
                node_id: node_id.clone(),
                reason,
            }),
            Ok(Err(_closed)) => Err(FileRequestError::Disconnected {
                node_id: node_id.clone(),
            }),
            Err(_elapsed) => {
                self.remove_pending(node_id, kind, &request_id);
                Err(FileRequestError::TimedOut {
                    node_id: node_id.clone(),
                })
            }
        }
    }

    fn remove_pending(&self, node_id: &NodeId, kind: RequestKind, request_id: &RequestId) {
        let mut inner = self.lock();
        let key = (node_id.clone(), kind);
        if let Some(queue) = inner.pending.get_mut(&key) {
            queue.retain(|pending| &pending.request_id != request_id);
            if queue.is_empty() {
                inner.pending.remove(&key);
            }
        }
    }

    fn complete_oldest(&self, node_id: &NodeId, kind: RequestKind, outcome: Result<String, String>) -> bool {
        let mut inner = self.lock();
        let key = (node_id.clone(), kind);
        let Some(queue) = inner.pending.get_mut(&key) else {
            return false;
        };
        let Some(pending) = queue.pop_front() else {
            return false;
        };
        if queue.is_empty() {
            inner.pending.remove(&key);
        }
        // The awaiting side may have timed out and dropped its receiver.
        let _ = pending.reply.send(outcome);
        true
    }

    /// Routes a `fileContentLoaded` response to the oldest pending load.
    pub fn resolve_loaded(&self, node_id: &NodeId, content: String) {
        if !self.complete_oldest(node_id, RequestKind::Load, Ok(content)) {
            tracing::debug!(node = %node_id, "fileContentLoaded without a pending load");
        }
    }

    /// Routes a `fileContentError` response. Loads are the documented error
    /// target; a host reporting a save failure this way still reaches the
    /// oldest pending save when no load is waiting.
    pub fn resolve_error(&self, node_id: &NodeId, error: String) {
        if self.complete_oldest(node_id, RequestKind::Load, Err(error.clone())) {
            return;
        }
        if !self.complete_oldest(node_id, RequestKind::Save, Err(error)) {
            tracing::debug!(node = %node_id, "fileContentError without a pending request");
        }
    }

    /// Routes a `fileContentSaved` acknowledgment to the oldest pending save.
    pub fn resolve_saved(&self, node_id: &NodeId) {
        if !self.complete_oldest(node_id, RequestKind::Save, Ok(String::new())) {
            tracing::debug!(node = %node_id, "fileContentSaved without a pending save");
        }
    }

    /// Number of in-flight correlated requests across all nodes.
    pub fn pending_requests(&self) -> usize {
        self.lock().pending.values().map(VecDeque::len).sum()
    }
}
