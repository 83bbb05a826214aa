// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph configuration records.
//!
//! These are the persisted shape of a graph: what `Save` writes and `Load`
//! reads, and what `Add`/`Edit`/`Connect` carry over the wire.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};

/// Job specification attached to a node.
///
/// `kind` selects a registered job type; `payload` is the type-specific
/// configuration, deserialized by the registry's constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl JobSpec {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { kind: kind.into(), payload }
    }
}

/// Immutable configuration of a node: declared ports and the job to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Assigned by the graph on `Add`; `0` means unassigned.
    #[serde(default)]
    pub id: NodeId,
    /// Input port names, 1-indexed by edges. A trailing `/` declares the
    /// port as a directory.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Output port names, 1-indexed by edges.
    #[serde(default)]
    pub outputs: Vec<String>,
    pub job: JobSpec,
}

/// A directed connection between two nodes.
///
/// `from_port`/`to_port` are 1-indexed positions into the endpoints'
/// output/input port arrays. Both present makes a file edge; both absent a
/// plain control edge. Mixed is rejected by `Connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConfig {
    pub from_node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u32>,
    pub to_node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u32>,
}

impl EdgeConfig {
    /// Control edge between two nodes, no ports.
    pub fn control(from: NodeId, to: NodeId) -> Self {
        Self { from_node_id: from, from_port: None, to_node_id: to, to_port: None }
    }

    /// File edge from an output port to an input port (1-indexed).
    pub fn file(from: NodeId, from_port: u32, to: NodeId, to_port: u32) -> Self {
        Self {
            from_node_id: from,
            from_port: Some(from_port),
            to_node_id: to,
            to_port: Some(to_port),
        }
    }

    /// Whether the edge carries files (both ports declared).
    pub fn is_file_edge(&self) -> bool {
        self.from_port.is_some() && self.to_port.is_some()
    }

    /// Whether exactly one endpoint declares a port.
    pub fn is_mixed(&self) -> bool {
        self.from_port.is_some() != self.to_port.is_some()
    }
}

impl std::fmt::Display for EdgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.from_port, self.to_port) {
            (Some(fp), Some(tp)) => {
                write!(f, "{}:{} -> {}:{}", self.from_node_id, fp, self.to_node_id, tp)
            }
            _ => write!(f, "{} -> {}", self.from_node_id, self.to_node_id),
        }
    }
}

/// The persisted graph: node configs in insertion order plus the edge list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub edges: Vec<EdgeConfig>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
