// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job interface.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Context handed to a job for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// The node's working directory. Staged inputs are already in place;
    /// declared outputs are expected here when the job finishes.
    pub dir: PathBuf,
}

/// Errors a job run can produce.
///
/// These never cross the RPC boundary directly; the engine records the
/// rendered message in the node's `Done` state.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to spawn process: {0}")]
    Spawn(std::io::Error),

    #[error("process {0}")]
    Exit(std::process::ExitStatus),

    #[error("killed")]
    Killed,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A unit of execution owned by a node.
///
/// `run` blocks until the work finishes. `kill` is asynchronous with respect
/// to `run`: it must cause an in-flight `run` to return promptly, and is
/// called from a different task (under the engine's serializer). Artifacts
/// stay collectable after `run` returns, until the node is reset.
#[async_trait]
pub trait Job: Send + Sync + std::fmt::Debug {
    async fn run(&self, ctx: RunContext) -> Result<(), JobError>;

    fn kill(&self);

    fn collect_artifacts(&self) -> HashMap<String, String>;
}
