// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses from the daemon to clients.

use lattice_core::{ErrorKind, NodeId, NodeStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response from the daemon to a client request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Request succeeded with nothing to return
    Ok,

    /// Id assigned to a newly added node
    NodeId { id: NodeId },

    /// Artifact snapshot from `NodeArts`
    Arts { arts: HashMap<String, String> },

    /// Node state snapshot from `GraphStates`
    States { states: Vec<NodeStatus> },

    /// Request failed
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error { kind, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
