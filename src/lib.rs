// SPDX-FileCopyrightText: 2026 Tela Authors
// SPDX-License-Identifier: MIT

//! Tela — canvas document synchronization engine.
//!
//! Keeps a live, editable graph document losslessly convertible to and from
//! its canonical JSON form, persists it with debounced saves, and manages
//! file-backed nodes over a correlated host message protocol.

pub mod engine;
pub mod file;
pub mod format;
pub mod host;
pub mod model;
pub mod store;
pub mod sync;
