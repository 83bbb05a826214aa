// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node state as observed by clients.
//!
//! The engine stores its own lifecycle representation; this is the snapshot
//! shape carried by sync events and state queries. `is_ready` is derived from
//! the predecessors at snapshot time, never stored authoritatively.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};

/// Declared intent of an idle node that is waiting on its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Do nothing when the node becomes ready.
    #[default]
    None,
    /// Run automatically when the node becomes ready.
    Scheduled,
    /// Mark done (skipped) automatically when the node becomes ready.
    Skipped,
}

crate::simple_display! {
    Plan {
        None => "none",
        Scheduled => "scheduled",
        Skipped => "skipped",
    }
}

/// Sub-state of a node whose job is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Running,
    /// `Stop` was requested; the job has been killed but has not returned yet.
    Stopping,
    /// `Skip` was requested; the job keeps running but successors already
    /// treat this node as a satisfied input.
    Skipping,
}

crate::simple_display! {
    Progress {
        Running => "running",
        Stopping => "stopping",
        Skipping => "skipping",
    }
}

/// Snapshot of one node's lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum NodeState {
    Idle {
        is_ready: bool,
        plan: Plan,
    },
    InProgress {
        status: Progress,
    },
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        stopped: bool,
        skipped: bool,
        from_idle: bool,
    },
}

impl NodeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, NodeState::Idle { .. })
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, NodeState::InProgress { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, NodeState::Done { .. })
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Idle { is_ready, plan } => {
                write!(f, "idle(ready={is_ready}, plan={plan})")
            }
            NodeState::InProgress { status } => write!(f, "in_progress({status})"),
            NodeState::Done { error, stopped, skipped, from_idle } => {
                match error {
                    Some(e) => write!(f, "done(error={e}")?,
                    None => write!(f, "done(ok")?,
                }
                if *stopped {
                    write!(f, ", stopped")?;
                }
                if *skipped {
                    write!(f, ", skipped")?;
                }
                if *from_idle {
                    write!(f, ", from_idle")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A node id paired with its state snapshot, as returned by state queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub id: NodeId,
    pub state: NodeState,
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
