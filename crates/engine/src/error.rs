// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine errors and their client-facing kinds.

use lattice_core::{EdgeConfig, ErrorKind, NodeId, NodeState};
use thiserror::Error;

/// Errors returned by engine operations.
///
/// None of these are retried; they go back to the caller. Job runtime
/// failures are not errors at this level — they surface as `Done { error }`
/// on the sync stream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("node (id={0}) not found")]
    NotFound(NodeId),

    #[error("invalid operation for node with state {0}")]
    InvalidState(NodeState),

    #[error("node is not ready")]
    NotReady,

    #[error("edge {{{0}}} already exists")]
    DuplicateEdge(EdgeConfig),

    #[error("edge {{{0}}} does not exist")]
    EdgeMissing(EdgeConfig),

    #[error("{side} node (id={id}) does not exist")]
    NodeMissing { side: &'static str, id: NodeId },

    #[error("edge {{{0}}} must declare both ports or neither")]
    PortTypeMismatch(EdgeConfig),

    #[error("node (id={0}) has edges")]
    HasEdges(NodeId),

    #[error("job creation failed: {0}")]
    JobCreation(String),

    #[error("staging failed: {0}")]
    Staging(String),

    #[error("unknown job type: {0}")]
    UnknownJobType(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// The client-facing kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::InvalidState(_) => ErrorKind::InvalidState,
            EngineError::NotReady => ErrorKind::NotReady,
            EngineError::DuplicateEdge(_) => ErrorKind::DuplicateEdge,
            EngineError::EdgeMissing(_) => ErrorKind::EdgeMissing,
            EngineError::NodeMissing { .. } => ErrorKind::NodeMissing,
            EngineError::PortTypeMismatch(_) => ErrorKind::PortTypeMismatch,
            EngineError::HasEdges(_) => ErrorKind::HasEdges,
            EngineError::JobCreation(_) => ErrorKind::JobCreationFailed,
            EngineError::Staging(_) => ErrorKind::StagingFailed,
            EngineError::UnknownJobType(_) => ErrorKind::UnknownJobType,
            EngineError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
