// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync stream events.
//!
//! A subscriber first receives a snapshot (`InitNode`* then `InitEdge`* then
//! `InitDone`), followed by live updates in the engine's publication order.
//! `Reset` announces that the whole graph was replaced; the stream closes
//! shortly after.

use crate::config::{EdgeConfig, NodeConfig};
use crate::id::NodeId;
use crate::state::NodeState;
use serde::{Deserialize, Serialize};

/// One event on the sync stream.
///
/// Serializes with a `{"type": "...", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The graph was replaced (`New`/`Load`); discard all known state.
    Reset,

    /// Snapshot entry: one existing node with its config and current state.
    InitNode { config: NodeConfig, state: NodeState },

    /// Snapshot entry: one existing edge, in insertion order.
    InitEdge { edge: EdgeConfig },

    /// Snapshot complete; live updates follow.
    InitDone,

    /// A node's state changed.
    UpdateState { id: NodeId, state: NodeState },

    /// A failure that occurred outside a request/response exchange
    /// (background staging, auto-transitions).
    Error { message: String },
}

impl SyncEvent {
    /// Short tag for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::Reset => "reset",
            SyncEvent::InitNode { .. } => "init_node",
            SyncEvent::InitEdge { .. } => "init_edge",
            SyncEvent::InitDone => "init_done",
            SyncEvent::UpdateState { .. } => "update_state",
            SyncEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
