// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine: public API plus the global serializer.
//!
//! One process-wide mutex guards the graph holder. Every externally-visible
//! command locks it, mutates, and returns; job execution happens in
//! background tasks that re-acquire the lock only for completion
//! bookkeeping. The lock is never held across job execution, staging I/O,
//! or socket writes.

use crate::error::EngineError;
use crate::graph::{GraphCtx, Launch};
use crate::holder::GraphHolder;
use crate::staging;
use crate::sync::SyncBroadcaster;
use lattice_core::{EdgeConfig, NodeConfig, NodeId, NodeStatus, Plan, SyncEvent};
use lattice_jobs::{JobRegistry, RunContext};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Filesystem locations the engine works with.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Per-node working directories live under `<nodes_root>/<id>/`.
    pub nodes_root: PathBuf,
    /// Default save path, used by `New` and until a `Load`/`Save` changes it.
    pub save_path: PathBuf,
}

/// One sync subscription: the snapshot taken at subscribe time, the live
/// event channel, and the graph's lifecycle token (cancelled on replacement).
pub struct SyncSubscription {
    pub id: u64,
    pub snapshot: Vec<SyncEvent>,
    pub events: mpsc::UnboundedReceiver<SyncEvent>,
    pub cancelled: CancellationToken,
}

/// The graph-execution engine.
///
/// Cheap to clone; all clones share the same graph. Must be created inside a
/// tokio runtime (job supervision runs on spawned tasks).
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Mutex<GraphHolder>>,
    sync: Arc<SyncBroadcaster>,
}

impl Engine {
    pub fn new(registry: Arc<JobRegistry>, options: EngineOptions) -> Self {
        let sync = Arc::new(SyncBroadcaster::new());
        let (launch_tx, launch_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(GraphCtx {
            sync: Arc::clone(&sync),
            registry,
            launches: launch_tx,
            nodes_root: options.nodes_root,
        });
        let inner = Arc::new(Mutex::new(GraphHolder::new(ctx, options.save_path)));
        tokio::spawn(supervise(Arc::clone(&inner), launch_rx));
        Engine { inner, sync }
    }

    // -----------------------------------------------------------------
    // Graph service
    // -----------------------------------------------------------------

    /// Replace the current graph with an empty one.
    pub fn new_graph(&self) {
        self.inner.lock().new_graph();
    }

    /// Replace the current graph by loading a saved config.
    pub fn load(&self, path: &Path) -> Result<(), EngineError> {
        self.inner.lock().load(path)
    }

    /// Write the current config: to `path` if given, else the current path.
    pub fn save(&self, path: Option<&Path>) -> Result<(), EngineError> {
        let mut holder = self.inner.lock();
        match path {
            Some(path) => holder.save_to(path),
            None => holder.save_current(),
        }
    }

    pub fn connect(&self, edge: EdgeConfig) -> Result<(), EngineError> {
        let mut holder = self.inner.lock();
        holder.graph_mut().connect(edge)?;
        holder.save_current()
    }

    pub fn disconnect(&self, edge: EdgeConfig) -> Result<(), EngineError> {
        let mut holder = self.inner.lock();
        holder.graph_mut().disconnect(edge)?;
        holder.save_current()
    }

    /// Run every ready idle node; plan the rest (if unplanned) to run when
    /// they become ready.
    pub fn schedule_all(&self) {
        self.inner.lock().graph_mut().schedule_all();
    }

    /// Snapshot of all node states in insertion order.
    pub fn node_states(&self) -> Vec<NodeStatus> {
        self.inner.lock().graph().node_states()
    }

    /// Subscribe to the sync stream. The snapshot and the registration
    /// happen in one critical section, so the live events continue exactly
    /// where the snapshot ends.
    pub fn subscribe(&self) -> SyncSubscription {
        let holder = self.inner.lock();
        let (id, events) = self.sync.subscribe();
        SyncSubscription {
            id,
            snapshot: holder.graph().snapshot_events(),
            events,
            cancelled: holder.cancel_token(),
        }
    }

    pub fn unsubscribe(&self, id: u64) {
        self.sync.unsubscribe(id);
    }

    // -----------------------------------------------------------------
    // Node service
    // -----------------------------------------------------------------

    pub fn run_node(&self, id: NodeId) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().run(id)
    }

    pub fn schedule_node(&self, id: NodeId) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().schedule(id)
    }

    pub fn plan_node(&self, id: NodeId, plan: Plan) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().plan(id, plan)
    }

    pub fn stop_node(&self, id: NodeId) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().stop(id)
    }

    pub fn skip_node(&self, id: NodeId) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().skip(id)
    }

    pub fn done_node(&self, id: NodeId) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().mark_done(id)
    }

    pub fn reset_node(&self, id: NodeId) -> Result<(), EngineError> {
        self.inner.lock().graph_mut().reset(id)
    }

    pub fn collect_arts(&self, id: NodeId) -> Result<HashMap<String, String>, EngineError> {
        self.inner.lock().graph().collect_arts(id)
    }

    pub fn add_node(&self, config: NodeConfig) -> Result<NodeId, EngineError> {
        let mut holder = self.inner.lock();
        let id = holder.graph_mut().add_node(config);
        holder.save_current()?;
        Ok(id)
    }

    pub fn edit_node(&self, config: NodeConfig) -> Result<(), EngineError> {
        let mut holder = self.inner.lock();
        holder.graph_mut().edit_node(config)?;
        holder.save_current()
    }

    pub fn delete_node(&self, id: NodeId) -> Result<(), EngineError> {
        let mut holder = self.inner.lock();
        holder.graph_mut().delete_node(id)?;
        holder.save_current()
    }
}

/// Turns queued launches into detached job tasks. Runs until the engine is
/// dropped and the launch channel closes.
async fn supervise(inner: Arc<Mutex<GraphHolder>>, mut launches: mpsc::UnboundedReceiver<Launch>) {
    while let Some(launch) = launches.recv().await {
        tokio::spawn(run_job(Arc::clone(&inner), launch));
    }
}

/// Stage the working directory, run the job, then re-acquire the serializer
/// for completion bookkeeping. Completions for a replaced graph are
/// discarded (the jobs were left to finish against the defunct graph).
async fn run_job(inner: Arc<Mutex<GraphHolder>>, launch: Launch) {
    let Launch { epoch, id, job, plan } = launch;

    let mut staging_error = None;
    let result = match staging::apply(&plan).await {
        Ok(()) => job.run(RunContext { dir: plan.dir.clone() }).await.map_err(|e| e.to_string()),
        Err(message) => {
            let message = format!("staging failed: {message}");
            staging_error = Some(message.clone());
            Err(message)
        }
    };

    let mut holder = inner.lock();
    if holder.epoch() != epoch {
        tracing::warn!(id = %id, "job for a replaced graph finished, discarding");
        return;
    }
    if let Some(message) = staging_error {
        holder.graph_mut().report_error(message);
    }
    holder.graph_mut().complete(id, result.err());
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
