// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests from clients to the daemon.

use lattice_core::{EdgeConfig, NodeConfig, NodeId, Plan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request from a client to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    // -- graph --
    /// Replace the current graph with an empty one
    GraphNew,
    /// Replace the current graph by loading a saved config
    GraphLoad { path: PathBuf },
    /// Write the current graph config; `None` writes to the current path
    GraphSave {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Subscribe to the sync stream (snapshot, then live updates)
    GraphSync,
    /// Snapshot of all node states in insertion order
    GraphStates,
    /// Add an edge
    Connect { edge: EdgeConfig },
    /// Remove an edge
    Disconnect { edge: EdgeConfig },
    /// Run every ready idle node, plan the rest
    ScheduleAll,

    // -- node --
    /// Start the node's job now (node must be idle and ready)
    NodeRun { id: NodeId },
    /// Run now if ready, otherwise plan to run when ready
    NodeSchedule { id: NodeId },
    /// Set the idle node's plan
    NodePlan { id: NodeId, plan: Plan },
    /// Kill the node's running job
    NodeStop { id: NodeId },
    /// Mark the running node as satisfied for its successors
    NodeSkip { id: NodeId },
    /// Mark the idle node done without running it
    NodeDone { id: NodeId },
    /// Return the node (and its downstream) to idle
    NodeReset { id: NodeId },
    /// Collect the node's job artifacts
    NodeArts { id: NodeId },
    /// Add a node; the daemon assigns the id
    NodeAdd { config: NodeConfig },
    /// Replace the node's config in place (`config.id` selects the node)
    NodeEdit { config: NodeConfig },
    /// Remove a node that has no edges
    NodeDelete { id: NodeId },
}

impl Request {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::GraphNew => "graph_new",
            Request::GraphLoad { .. } => "graph_load",
            Request::GraphSave { .. } => "graph_save",
            Request::GraphSync => "graph_sync",
            Request::GraphStates => "graph_states",
            Request::Connect { .. } => "connect",
            Request::Disconnect { .. } => "disconnect",
            Request::ScheduleAll => "schedule_all",
            Request::NodeRun { .. } => "node_run",
            Request::NodeSchedule { .. } => "node_schedule",
            Request::NodePlan { .. } => "node_plan",
            Request::NodeStop { .. } => "node_stop",
            Request::NodeSkip { .. } => "node_skip",
            Request::NodeDone { .. } => "node_done",
            Request::NodeReset { .. } => "node_reset",
            Request::NodeArts { .. } => "node_arts",
            Request::NodeAdd { .. } => "node_add",
            Request::NodeEdit { .. } => "node_edit",
            Request::NodeDelete { .. } => "node_delete",
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
