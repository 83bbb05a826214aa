// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lattice-engine: the graph-execution engine.
//!
//! Owns the per-node state machine, readiness propagation between nodes,
//! supervised job lifecycle, filesystem staging of artifacts between
//! connected nodes, and the ordered sync broadcast. Every externally-visible
//! mutation and every job-completion callback passes through one
//! process-wide serializer, which is what makes the graph coherent under
//! concurrent commands and background completions.

pub mod engine;
pub mod error;
pub mod event;
mod graph;
mod holder;
mod node;
mod staging;
mod sync;

pub use engine::{Engine, EngineOptions, SyncSubscription};
pub use error::EngineError;
pub use event::{DoneAction, DoneEvent};
