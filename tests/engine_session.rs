// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! End-to-end session behavior through the composed engine: handshake,
//! load/save round-trip and file-backed node requests over the dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use tela::engine::CanvasEngine;
use tela::format::parse_document;
use tela::host::{ChannelHost, EngineMessage, HostMessage};
use tela::model::NodeId;

fn start() -> (CanvasEngine, mpsc::UnboundedReceiver<EngineMessage>) {
    let (host, outgoing) = ChannelHost::pair();
    let engine = CanvasEngine::start(Arc::new(host));
    (engine, outgoing)
}

#[tokio::test(start_paused = true)]
async fn startup_announces_ready_first() {
    let (_engine, mut outgoing) = start();
    assert_eq!(outgoing.try_recv().ok(), Some(EngineMessage::Ready));
}

#[tokio::test(start_paused = true)]
async fn load_edit_save_round_trip() {
    let (engine, mut outgoing) = start();
    assert_eq!(outgoing.try_recv().ok(), Some(EngineMessage::Ready));

    engine.deliver(HostMessage::LoadContent {
        content: r#"{"nodes":[{"id":"a","x":0,"y":0,"type":"text","text":"hi"}],"edges":[]}"#
            .to_owned(),
    });
    sleep(Duration::from_millis(50)).await;

    let (nodes, _) = engine.store().snapshot();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].data.label, "hi");
    assert!(outgoing.try_recv().is_err(), "load must not echo a save");

    sleep(Duration::from_millis(100)).await;
    engine.store().create_node(100.0, 100.0);
    sleep(Duration::from_millis(600)).await;

    let Some(EngineMessage::Save { content }) = outgoing.try_recv().ok() else {
        panic!("expected a save after the debounce window");
    };
    assert!(outgoing.try_recv().is_err(), "mutations coalesce to one save");

    let document = parse_document(&content).expect("saved document parses");
    assert_eq!(document.nodes.len(), 2);
    // The loaded node was normalized on its way back out.
    let loaded = document
        .nodes
        .iter()
        .find(|node| node.id.as_str() == "a")
        .expect("loaded node persists");
    assert_eq!(loaded.width, Some(250.0));
    assert_eq!(loaded.height, Some(60.0));
    assert_eq!(loaded.text.as_deref(), Some("hi"));
}

#[tokio::test(start_paused = true)]
async fn file_load_round_trips_through_the_dispatcher() {
    let (engine, mut outgoing) = start();
    let _ = outgoing.try_recv();

    let node = engine.store().create_node(0.0, 0.0);
    let files = engine.files().clone();
    let task = tokio::spawn({
        let node_id = node.id.clone();
        async move { files.load_file(&node_id, "notes/a.md").await }
    });
    while engine.files().pending_requests() == 0 {
        tokio::task::yield_now().await;
    }

    // A response for another node must not resolve the request.
    engine.deliver(HostMessage::FileContentLoaded {
        node_id: NodeId::new("other"),
        content: "wrong".to_owned(),
    });
    engine.deliver(HostMessage::FileContentLoaded {
        node_id: node.id.clone(),
        content: "# body".to_owned(),
    });

    let result = task.await.expect("task").expect("load");
    assert_eq!(result.as_deref(), Some("# body"));
    let updated = engine.store().node(&node.id).expect("node");
    assert_eq!(updated.data.text.as_deref(), Some("# body"));
}

#[tokio::test(start_paused = true)]
async fn api_key_delivery_lands_in_the_config_slot() {
    let (engine, _outgoing) = start();

    let mut api_key = engine.api_key();
    assert_eq!(*api_key.borrow(), None);

    engine.deliver(HostMessage::GroqApiKey {
        key: "gsk_test".to_owned(),
    });
    api_key.changed().await.expect("config update");
    assert_eq!(api_key.borrow().as_deref(), Some("gsk_test"));
}
