// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! Tela stdio bridge.
//!
//! Runs the canvas engine against a host process over newline-delimited JSON:
//! host messages arrive one per line on stdin, engine messages leave one per
//! line on stdout. The first line written is the `ready` handshake.

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use tela::engine::CanvasEngine;
use tela::host::{ChannelHost, HostMessage};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program}\n\nSpeaks the tela host protocol over stdio: one JSON message per line,\nhost -> engine on stdin, engine -> host on stdout."
    );
}

async fn serve_stdio() -> Result<(), Box<dyn Error>> {
    let (host, mut outgoing) = ChannelHost::pair();
    let engine = CanvasEngine::start(Arc::new(host));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = outgoing.recv().await {
            let line = match message.encode() {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(%err, "dropping unencodable engine message");
                    continue;
                }
            };
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if stdout.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match HostMessage::decode(&line) {
            Ok(message) => engine.deliver(message),
            Err(err) => tracing::warn!(%err, "ignoring malformed host message"),
        }
    }

    drop(engine);
    writer.abort();
    Ok(())
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "tela".to_owned());
    if args.next().is_some() {
        print_usage(&program);
        std::process::exit(2);
    }

    let result = (|| -> Result<(), Box<dyn Error>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(serve_stdio())
    })();

    if let Err(err) = result {
        eprintln!("tela: {err}");
        std::process::exit(1);
    }
}
