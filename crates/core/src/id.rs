// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node identifier.

use serde::{Deserialize, Serialize};

/// Unique identifier for a node within a graph.
///
/// Positive, assigned by the graph on `Add` (smallest unused id). Zero is
/// the "unassigned" value carried by a `NodeConfig` before insertion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Whether the id has been assigned by a graph.
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        NodeId(raw)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
