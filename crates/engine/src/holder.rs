// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Holder of the currently-loaded graph.
//!
//! Owns the graph's save path and lifecycle: `new`/`load` replace the graph
//! wholesale (announcing a `Reset` to subscribers and cancelling the old
//! lifecycle token), `save` writes the pretty-printed JSON config. Every
//! structural mutation auto-saves to the current path.

use crate::error::EngineError;
use crate::graph::{Graph, GraphCtx};
use lattice_core::{GraphConfig, SyncEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) struct GraphHolder {
    graph: Graph,
    /// Bumped on every replacement; stale job completions compare against it.
    epoch: u64,
    current_path: PathBuf,
    default_path: PathBuf,
    cancel: CancellationToken,
    ctx: Arc<GraphCtx>,
}

impl GraphHolder {
    pub fn new(ctx: Arc<GraphCtx>, default_path: PathBuf) -> Self {
        let graph = Graph::new(Arc::clone(&ctx), 0, GraphConfig::default());
        Self {
            graph,
            epoch: 0,
            current_path: default_path.clone(),
            default_path,
            cancel: CancellationToken::new(),
            ctx,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace the current graph with an empty one.
    pub fn new_graph(&mut self) {
        self.replace(GraphConfig::default());
        self.current_path = self.default_path.clone();
    }

    /// Replace the current graph by decoding a saved config.
    pub fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        let data = std::fs::read_to_string(path)?;
        let config: GraphConfig = serde_json::from_str(&data).map_err(invalid_data)?;
        self.replace(config);
        self.current_path = path.to_path_buf();
        Ok(())
    }

    /// Write the config to an explicit path, which becomes the current path.
    pub fn save_to(&mut self, path: &Path) -> Result<(), EngineError> {
        self.write_config(path)?;
        self.current_path = path.to_path_buf();
        Ok(())
    }

    /// Write the config to the current path (auto-save).
    pub fn save_current(&mut self) -> Result<(), EngineError> {
        let path = self.current_path.clone();
        self.write_config(&path)
    }

    fn write_config(&self, path: &Path) -> Result<(), EngineError> {
        let data = serde_json::to_string_pretty(&self.graph.to_config()).map_err(invalid_data)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Swap in a new graph: announce the reset, drop every subscriber (their
    /// channels close once drained), cancel the old lifecycle, then replay
    /// the initial state. In-flight jobs are left to finish; their
    /// completions are discarded by the epoch check.
    fn replace(&mut self, config: GraphConfig) {
        self.ctx.sync.report(SyncEvent::Reset);
        self.ctx.sync.close_all();
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.epoch += 1;
        self.graph = Graph::new(Arc::clone(&self.ctx), self.epoch, config);
        for event in self.graph.snapshot_events() {
            self.ctx.sync.report(event);
        }
    }
}

fn invalid_data(e: serde_json::Error) -> EngineError {
    EngineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
#[path = "holder_tests.rs"]
mod tests;
