// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-facing error taxonomy.
//!
//! Every engine failure maps onto one of these kinds before it crosses the
//! wire; the accompanying message carries the detail (e.g. the rendered
//! current state for `InvalidState`).

use serde::{Deserialize, Serialize};

/// Kind of an engine error, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Node id unknown.
    NotFound,
    /// Operation not valid from the node's current state.
    InvalidState,
    /// Run attempted on a non-ready node.
    NotReady,
    DuplicateEdge,
    EdgeMissing,
    NodeMissing,
    /// Exactly one of the edge's ports was declared.
    PortTypeMismatch,
    /// Delete attempted on a node that still has edges.
    HasEdges,
    JobCreationFailed,
    StagingFailed,
    UnknownJobType,
    Io,
}

crate::simple_display! {
    ErrorKind {
        NotFound => "not_found",
        InvalidState => "invalid_state",
        NotReady => "not_ready",
        DuplicateEdge => "duplicate_edge",
        EdgeMissing => "edge_missing",
        NodeMissing => "node_missing",
        PortTypeMismatch => "port_type_mismatch",
        HasEdges => "has_edges",
        JobCreationFailed => "job_creation_failed",
        StagingFailed => "staging_failed",
        UnknownJobType => "unknown_job_type",
        Io => "io",
    }
}
