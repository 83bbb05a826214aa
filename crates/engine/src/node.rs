// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One node: config, lifecycle state, done event, and the live job.

use crate::event::DoneEvent;
use lattice_core::{NodeConfig, NodeState, Plan, Progress};
use lattice_jobs::Job;
use std::sync::Arc;

/// Internal lifecycle of a node.
///
/// Unlike [`NodeState`], idle readiness is not stored here — it is derived
/// from the predecessors whenever a snapshot is taken.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle {
    Idle {
        plan: Plan,
    },
    InProgress {
        status: Progress,
    },
    Done {
        error: Option<String>,
        stopped: bool,
        skipped: bool,
        from_idle: bool,
    },
}

/// Coarse phase of a lifecycle, for dispatching cascades without borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InProgress,
    Done,
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        match self {
            Lifecycle::Idle { .. } => Phase::Idle,
            Lifecycle::InProgress { .. } => Phase::InProgress,
            Lifecycle::Done { .. } => Phase::Done,
        }
    }

    /// Whether a successor may treat this node as a satisfied input: the
    /// node is being skipped, finished cleanly, or finished as skipped.
    pub fn ready_as_input(&self) -> bool {
        match self {
            Lifecycle::InProgress { status } => *status == Progress::Skipping,
            Lifecycle::Done { error, skipped, .. } => error.is_none() || *skipped,
            Lifecycle::Idle { .. } => false,
        }
    }

    /// The client-facing snapshot, given the derived readiness.
    pub fn state(&self, is_ready: bool) -> NodeState {
        match self {
            Lifecycle::Idle { plan } => NodeState::Idle { is_ready, plan: *plan },
            Lifecycle::InProgress { status } => NodeState::InProgress { status: *status },
            Lifecycle::Done { error, stopped, skipped, from_idle } => NodeState::Done {
                error: error.clone(),
                stopped: *stopped,
                skipped: *skipped,
                from_idle: *from_idle,
            },
        }
    }
}

/// A node in the graph.
pub struct Node {
    pub config: NodeConfig,
    pub lifecycle: Lifecycle,
    /// Fired when the node reaches `Done`; re-armed by reset.
    pub done_event: DoneEvent,
    /// Present from run until reset, so artifacts stay collectable after
    /// completion.
    pub job: Option<Arc<dyn Job>>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Idle { plan: Plan::None },
            done_event: DoneEvent::new(),
            job: None,
        }
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
