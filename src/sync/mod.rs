// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! The synchronization engine.
//!
//! One task per document session observes store changes, debounces them into
//! a single `save` per quiet window, and handles wholesale `loadContent`
//! replacements. The session moves `Idle → Dirty → (debounce) → Persisting →
//! Idle`; a load enters `Loading`, which suppresses the Dirty transition
//! until a short guard delay after the replacement so the load is never
//! echoed straight back as a save.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::format::{dangling_edges, parse_document, serialize_document, to_internal, to_persisted};
use crate::host::{EngineMessage, HostChannel};
use crate::store::{DocumentStore, StoreEvent};

/// Quiet window after the last mutation before a save is issued.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Suppression window after a document replacement, absorbing its own
/// change notifications.
pub const LOAD_GUARD: Duration = Duration::from_millis(100);

/// Observable session state, derived from the engine's timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Dirty,
    Loading,
    Persisting,
}

/// The per-session synchronization task.
///
/// Construct with [`SyncEngine::new`] and drive with [`SyncEngine::run`];
/// `loadContent` deliveries arrive over the channel handed to `new`.
pub struct SyncEngine {
    store: DocumentStore,
    host: Arc<dyn HostChannel>,
    events: mpsc::UnboundedReceiver<StoreEvent>,
    loads: mpsc::UnboundedReceiver<String>,
    deadline: Option<Instant>,
    suppress_until: Option<Instant>,
    parse_errors: Arc<AtomicU64>,
}

impl SyncEngine {
    pub fn new(
        store: DocumentStore,
        host: Arc<dyn HostChannel>,
        loads: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        let events = store.subscribe();
        Self {
            store,
            host,
            events,
            loads,
            deadline: None,
            suppress_until: None,
            parse_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Counter of rejected `loadContent` payloads; the prior document is
    /// retained whenever this increments.
    pub fn parse_error_counter(&self) -> Arc<AtomicU64> {
        self.parse_errors.clone()
    }

    fn state(&self, now: Instant) -> SyncState {
        if self.suppress_until.is_some_and(|until| now < until) {
            SyncState::Loading
        } else if self.deadline.is_some() {
            SyncState::Dirty
        } else {
            SyncState::Idle
        }
    }

    fn handle_event(&mut self, now: Instant) {
        if self.state(now) == SyncState::Loading {
            tracing::trace!("store change suppressed during load guard");
            return;
        }
        self.suppress_until = None;
        self.deadline = Some(now + DEBOUNCE_WINDOW);
    }

    fn handle_load(&mut self, content: &str, now: Instant) {
        match parse_document(content) {
            Ok(document) => {
                let (nodes, edges) = to_internal(&document);
                let dangling = dangling_edges(&nodes, &edges);
                if !dangling.is_empty() {
                    tracing::warn!(count = dangling.len(), "loaded edges reference missing nodes");
                }
                tracing::debug!(nodes = nodes.len(), edges = edges.len(), "document loaded");
                self.store.replace(nodes, edges);
                // A pending dirty window belongs to the replaced document.
                self.deadline = None;
                self.suppress_until = Some(now + LOAD_GUARD);
            }
            Err(err) => {
                self.parse_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(%err, "rejected malformed document; prior content retained");
            }
        }
    }

    fn persist(&mut self) {
        self.deadline = None;
        let (nodes, edges) = self.store.snapshot();
        let document = to_persisted(&nodes, &edges);
        match serialize_document(&document) {
            Ok(content) => {
                tracing::debug!(
                    nodes = document.nodes.len(),
                    edges = document.edges.len(),
                    "persisting document"
                );
                self.host.send(EngineMessage::Save { content });
            }
            Err(err) => {
                tracing::warn!(%err, "document serialization failed; save skipped");
            }
        }
    }

    /// Runs until both the store and the load channel are gone.
    pub async fn run(mut self) {
        let mut events_open = true;
        let mut loads_open = true;

        while events_open || loads_open {
            let deadline = self.deadline;
            tokio::select! {
                maybe_event = self.events.recv(), if events_open => {
                    match maybe_event {
                        Some(_event) => self.handle_event(Instant::now()),
                        None => events_open = false,
                    }
                }
                maybe_load = self.loads.recv(), if loads_open => {
                    match maybe_load {
                        Some(content) => self.handle_load(&content, Instant::now()),
                        None => loads_open = false,
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.persist();
                }
            }
        }
    }
}
