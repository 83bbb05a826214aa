// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The graph: node set, edge list, and every state-machine operation.
//!
//! All methods here are called with the engine's serializer held. Cross-node
//! work (readiness, input-change propagation, cascading reset) happens as
//! plain recursion over node ids; termination relies on the graph being
//! acyclic, which is the caller's contract.

use crate::error::EngineError;
use crate::event::{DoneAction, DoneEvent};
use crate::node::{Lifecycle, Node, Phase};
use crate::staging::{self, StagePlan};
use crate::sync::SyncBroadcaster;
use lattice_core::{
    EdgeConfig, GraphConfig, NodeConfig, NodeId, NodeState, NodeStatus, Plan, Progress, SyncEvent,
};
use lattice_jobs::registry::RegistryError;
use lattice_jobs::{Job, JobRegistry};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A job handed to the engine's supervisor for background execution.
pub(crate) struct Launch {
    pub epoch: u64,
    pub id: NodeId,
    pub job: Arc<dyn Job>,
    pub plan: StagePlan,
}

/// Shared services a graph uses to act on the outside world.
pub(crate) struct GraphCtx {
    pub sync: Arc<SyncBroadcaster>,
    pub registry: Arc<JobRegistry>,
    pub launches: mpsc::UnboundedSender<Launch>,
    pub nodes_root: PathBuf,
}

/// The set of nodes and edges, plus the machinery to run them.
pub(crate) struct Graph {
    ctx: Arc<GraphCtx>,
    /// Generation of this graph within the holder; launches carry it so that
    /// completions for a replaced graph can be discarded.
    epoch: u64,
    nodes: HashMap<NodeId, Node>,
    /// Node insertion order: drives snapshots, state queries, schedule-all.
    order: Vec<NodeId>,
    edges: Vec<EdgeConfig>,
}

impl Graph {
    pub(crate) fn new(ctx: Arc<GraphCtx>, epoch: u64, config: GraphConfig) -> Self {
        let mut graph =
            Graph { ctx, epoch, nodes: HashMap::new(), order: Vec::new(), edges: Vec::new() };
        for node_config in config.nodes {
            let id = node_config.id;
            if !id.is_assigned() || graph.nodes.contains_key(&id) {
                tracing::warn!(id = %id, "dropping node with unassigned or duplicate id");
                continue;
            }
            graph.nodes.insert(id, Node::new(node_config));
            graph.order.push(id);
        }
        for edge in config.edges {
            if !graph.nodes.contains_key(&edge.from_node_id)
                || !graph.nodes.contains_key(&edge.to_node_id)
            {
                tracing::warn!(edge = %edge, "dropping edge referencing a missing node");
                continue;
            }
            graph.edges.push(edge);
        }
        graph
    }

    // -----------------------------------------------------------------
    // Lookups and snapshots
    // -----------------------------------------------------------------

    fn node(&self, id: NodeId) -> Result<&Node, EngineError> {
        self.nodes.get(&id).ok_or(EngineError::NotFound(id))
    }

    /// Direct predecessors, deduplicated, in edge order.
    fn inputs(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for edge in &self.edges {
            if edge.to_node_id == id && !ids.contains(&edge.from_node_id) {
                ids.push(edge.from_node_id);
            }
        }
        ids
    }

    /// Direct successors, deduplicated, in edge order.
    fn outputs(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for edge in &self.edges {
            if edge.from_node_id == id && !ids.contains(&edge.to_node_id) {
                ids.push(edge.to_node_id);
            }
        }
        ids
    }

    /// A node is ready iff every direct predecessor counts as a satisfied
    /// input. Computed on demand, never stored.
    pub(crate) fn is_ready(&self, id: NodeId) -> bool {
        self.inputs(id)
            .into_iter()
            .all(|pred| self.nodes.get(&pred).is_some_and(|n| n.lifecycle.ready_as_input()))
    }

    fn state_of(&self, id: NodeId) -> NodeState {
        self.nodes
            .get(&id)
            .map(|node| node.lifecycle.state(self.is_ready(id)))
            .unwrap_or(NodeState::Idle { is_ready: false, plan: Plan::None })
    }

    pub(crate) fn node_states(&self) -> Vec<NodeStatus> {
        self.order.iter().map(|id| NodeStatus { id: *id, state: self.state_of(*id) }).collect()
    }

    /// The initial-state replay sent to a new sync subscriber.
    pub(crate) fn snapshot_events(&self) -> Vec<SyncEvent> {
        let mut events = Vec::with_capacity(self.order.len() + self.edges.len() + 1);
        for id in &self.order {
            if let Some(node) = self.nodes.get(id) {
                events.push(SyncEvent::InitNode {
                    config: node.config.clone(),
                    state: self.state_of(*id),
                });
            }
        }
        for edge in &self.edges {
            events.push(SyncEvent::InitEdge { edge: edge.clone() });
        }
        events.push(SyncEvent::InitDone);
        events
    }

    pub(crate) fn to_config(&self) -> GraphConfig {
        GraphConfig {
            nodes: self
                .order
                .iter()
                .filter_map(|id| self.nodes.get(id))
                .map(|node| node.config.clone())
                .collect(),
            edges: self.edges.clone(),
        }
    }

    pub(crate) fn collect_arts(
        &self,
        id: NodeId,
    ) -> Result<HashMap<String, String>, EngineError> {
        let node = self.node(id)?;
        Ok(node.job.as_ref().map(|job| job.collect_artifacts()).unwrap_or_default())
    }

    fn broadcast_state(&self, id: NodeId) {
        self.ctx.sync.report(SyncEvent::UpdateState { id, state: self.state_of(id) });
    }

    pub(crate) fn report_error(&self, message: String) {
        self.ctx.sync.report(SyncEvent::Error { message });
    }

    // -----------------------------------------------------------------
    // Node operations (RPC entry points)
    // -----------------------------------------------------------------

    pub(crate) fn run(&mut self, id: NodeId) -> Result<(), EngineError> {
        if self.node(id)?.lifecycle.phase() != Phase::Idle {
            return Err(EngineError::InvalidState(self.state_of(id)));
        }
        if !self.is_ready(id) {
            return Err(EngineError::NotReady);
        }
        self.start_job(id)
    }

    pub(crate) fn schedule(&mut self, id: NodeId) -> Result<(), EngineError> {
        if self.node(id)?.lifecycle.phase() != Phase::Idle {
            return Err(EngineError::InvalidState(self.state_of(id)));
        }
        if self.is_ready(id) {
            self.start_job(id)
        } else {
            self.set_plan(id, Plan::Scheduled);
            Ok(())
        }
    }

    pub(crate) fn plan(&mut self, id: NodeId, plan: Plan) -> Result<(), EngineError> {
        if self.node(id)?.lifecycle.phase() != Phase::Idle || self.is_ready(id) {
            return Err(EngineError::InvalidState(self.state_of(id)));
        }
        self.set_plan(id, plan);
        Ok(())
    }

    pub(crate) fn stop(&mut self, id: NodeId) -> Result<(), EngineError> {
        let status = match &self.node(id)?.lifecycle {
            Lifecycle::InProgress { status } => *status,
            _ => return Err(EngineError::InvalidState(self.state_of(id))),
        };
        match status {
            Progress::Running | Progress::Skipping => {
                self.stop_internal(id);
                Ok(())
            }
            // A second stop while stopping is a no-op.
            Progress::Stopping => Ok(()),
        }
    }

    pub(crate) fn skip(&mut self, id: NodeId) -> Result<(), EngineError> {
        let status = match &self.node(id)?.lifecycle {
            Lifecycle::InProgress { status } => Some(*status),
            _ => None,
        };
        if status != Some(Progress::Running) {
            return Err(EngineError::InvalidState(self.state_of(id)));
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.lifecycle = Lifecycle::InProgress { status: Progress::Skipping };
        }
        self.broadcast_state(id);
        // Successors may treat a skipping node as a satisfied input already.
        for out in self.outputs(id) {
            self.on_input_change(out);
        }
        Ok(())
    }

    pub(crate) fn mark_done(&mut self, id: NodeId) -> Result<(), EngineError> {
        if self.node(id)?.lifecycle.phase() != Phase::Idle {
            return Err(EngineError::InvalidState(self.state_of(id)));
        }
        self.mark_done_internal(id);
        Ok(())
    }

    pub(crate) fn reset(&mut self, id: NodeId) -> Result<(), EngineError> {
        if self.node(id)?.lifecycle.phase() != Phase::Done {
            return Err(EngineError::InvalidState(self.state_of(id)));
        }
        self.reset_internal(id);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Graph operations
    // -----------------------------------------------------------------

    pub(crate) fn add_node(&mut self, mut config: NodeConfig) -> NodeId {
        let mut raw = 1;
        while self.nodes.contains_key(&NodeId(raw)) {
            raw += 1;
        }
        let id = NodeId(raw);
        config.id = id;
        self.nodes.insert(id, Node::new(config));
        self.order.push(id);
        self.broadcast_state(id);
        id
    }

    pub(crate) fn edit_node(&mut self, config: NodeConfig) -> Result<(), EngineError> {
        let id = config.id;
        let node = self.nodes.get_mut(&id).ok_or(EngineError::NotFound(id))?;
        node.config = config;
        self.broadcast_state(id);
        Ok(())
    }

    pub(crate) fn delete_node(&mut self, id: NodeId) -> Result<(), EngineError> {
        if !self.nodes.contains_key(&id) {
            return Err(EngineError::NotFound(id));
        }
        if self.edges.iter().any(|e| e.from_node_id == id || e.to_node_id == id) {
            return Err(EngineError::HasEdges(id));
        }
        self.nodes.remove(&id);
        self.order.retain(|n| *n != id);
        Ok(())
    }

    pub(crate) fn connect(&mut self, edge: EdgeConfig) -> Result<(), EngineError> {
        if edge.is_mixed() {
            return Err(EngineError::PortTypeMismatch(edge));
        }
        if !self.nodes.contains_key(&edge.from_node_id) {
            return Err(EngineError::NodeMissing { side: "from", id: edge.from_node_id });
        }
        if !self.nodes.contains_key(&edge.to_node_id) {
            return Err(EngineError::NodeMissing { side: "to", id: edge.to_node_id });
        }
        if self.edges.contains(&edge) {
            return Err(EngineError::DuplicateEdge(edge));
        }
        let to = edge.to_node_id;
        self.edges.push(edge);
        self.on_input_change(to);
        Ok(())
    }

    pub(crate) fn disconnect(&mut self, edge: EdgeConfig) -> Result<(), EngineError> {
        if !self.nodes.contains_key(&edge.from_node_id) {
            return Err(EngineError::NodeMissing { side: "from", id: edge.from_node_id });
        }
        if !self.nodes.contains_key(&edge.to_node_id) {
            return Err(EngineError::NodeMissing { side: "to", id: edge.to_node_id });
        }
        let Some(pos) = self.edges.iter().position(|e| *e == edge) else {
            return Err(EngineError::EdgeMissing(edge));
        };
        self.edges.remove(pos);
        self.on_input_change(edge.to_node_id);
        Ok(())
    }

    pub(crate) fn schedule_all(&mut self) {
        for id in self.order.clone() {
            let plan = match self.nodes.get(&id).map(|n| &n.lifecycle) {
                Some(Lifecycle::Idle { plan }) => *plan,
                _ => continue,
            };
            if self.is_ready(id) {
                if let Err(e) = self.start_job(id) {
                    tracing::error!(id = %id, error = %e, "schedule-all failed to run node");
                    self.report_error(format!("failed to run node (id={id}): {e}"));
                }
            } else if plan == Plan::None {
                self.set_plan(id, Plan::Scheduled);
            }
        }
    }

    // -----------------------------------------------------------------
    // Internal transitions
    // -----------------------------------------------------------------

    fn set_plan(&mut self, id: NodeId, plan: Plan) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if let Lifecycle::Idle { plan: current } = &mut node.lifecycle {
                *current = plan;
            }
        }
    }

    /// Construct the job and move the node into `InProgress { Running }`.
    /// Caller has verified the node is idle and ready (or is auto-running it
    /// from the input-change protocol, which implies both).
    fn start_job(&mut self, id: NodeId) -> Result<(), EngineError> {
        let node = self.node(id)?;
        let job = self.ctx.registry.create(&node.config.job).map_err(|e| match e {
            RegistryError::Unknown(kind) => EngineError::UnknownJobType(kind),
            RegistryError::Creation(message) => EngineError::JobCreation(message),
        })?;
        let plan = self.stage_plan(id)?;

        tracing::info!(id = %id, "job starting");
        if let Some(node) = self.nodes.get_mut(&id) {
            node.lifecycle = Lifecycle::InProgress { status: Progress::Running };
            node.job = Some(Arc::clone(&job));
        }
        self.broadcast_state(id);
        // The supervisor lives as long as the engine; a send only fails
        // during teardown, when nobody observes the launch anyway.
        let _ = self.ctx.launches.send(Launch { epoch: self.epoch, id, job, plan });
        Ok(())
    }

    /// Resolve the staging work for a run: the directory to rebuild, the
    /// directory-typed input ports, and one copy per incoming file edge.
    fn stage_plan(&self, id: NodeId) -> Result<StagePlan, EngineError> {
        let node = self.node(id)?;
        let dir = self.ctx.nodes_root.join(id.to_string());

        let subdirs = node
            .config
            .inputs
            .iter()
            .filter(|name| name.ends_with('/'))
            .map(|name| dir.join(name))
            .collect();

        let mut copies = Vec::new();
        for edge in &self.edges {
            if edge.to_node_id != id {
                continue;
            }
            let (Some(from_port), Some(to_port)) = (edge.from_port, edge.to_port) else {
                continue;
            };
            let from = self.node(edge.from_node_id)?;
            let src_name = port_name(&from.config.outputs, from_port).ok_or_else(|| {
                EngineError::Staging(format!("edge {{{edge}}}: output port {from_port} out of range"))
            })?;
            let dst_name = port_name(&node.config.inputs, to_port).ok_or_else(|| {
                EngineError::Staging(format!("edge {{{edge}}}: input port {to_port} out of range"))
            })?;
            copies.push((
                self.ctx.nodes_root.join(edge.from_node_id.to_string()).join(src_name),
                dir.join(dst_name),
            ));
        }

        Ok(StagePlan { dir, subdirs, copies })
    }

    /// A predecessor of `id` changed in a way that may affect its readiness:
    /// broadcast the state, then apply the pending plan if the node is idle
    /// and now ready.
    fn on_input_change(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.broadcast_state(id);

        let plan = match self.nodes.get(&id).map(|n| &n.lifecycle) {
            Some(Lifecycle::Idle { plan }) => *plan,
            _ => return,
        };
        if !self.is_ready(id) {
            return;
        }
        match plan {
            Plan::None => {}
            Plan::Scheduled => {
                if let Err(e) = self.start_job(id) {
                    tracing::error!(id = %id, error = %e, "failed to auto-run node");
                    self.report_error(format!("failed to auto-run node (id={id}): {e}"));
                }
            }
            Plan::Skipped => self.mark_done_internal(id),
        }
    }

    fn mark_done_internal(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.lifecycle =
                Lifecycle::Done { error: None, stopped: false, skipped: true, from_idle: true };
        }
        self.broadcast_state(id);
        self.after_done(id);
    }

    /// The node's job returned (or the staging for it failed). Runs on the
    /// completion path with the serializer held.
    pub(crate) fn complete(&mut self, id: NodeId, error: Option<String>) {
        let Some(node) = self.nodes.get_mut(&id) else {
            tracing::warn!(id = %id, "completion for a deleted node, discarding");
            return;
        };
        let status = match &node.lifecycle {
            Lifecycle::InProgress { status } => *status,
            other => {
                tracing::warn!(id = %id, state = %other.state(false), "completion in unexpected state, discarding");
                return;
            }
        };
        tracing::info!(id = %id, error = error.as_deref().unwrap_or("none"), "job finished");
        node.lifecycle = Lifecycle::Done {
            error,
            stopped: status == Progress::Stopping,
            skipped: status == Progress::Skipping,
            from_idle: false,
        };
        self.broadcast_state(id);
        self.after_done(id);
    }

    /// Shared tail of every transition into `Done`: propagate the change to
    /// successors, then run the actions parked on the done event.
    fn after_done(&mut self, id: NodeId) {
        for out in self.outputs(id) {
            self.on_input_change(out);
        }
        let actions = match self.nodes.get_mut(&id) {
            Some(node) => node.done_event.trigger(),
            None => Vec::new(),
        };
        for action in actions {
            match action {
                DoneAction::Reset => self.reset_internal(id),
            }
        }
    }

    fn stop_internal(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(&id) else { return };
        let can_stop = matches!(
            node.lifecycle,
            Lifecycle::InProgress { status: Progress::Running | Progress::Skipping }
        );
        if !can_stop {
            return;
        }
        node.lifecycle = Lifecycle::InProgress { status: Progress::Stopping };
        if let Some(job) = &node.job {
            job.kill();
        }
        self.broadcast_state(id);
    }

    /// Return the node to idle and cascade through its successors: idle ones
    /// re-evaluate readiness, in-flight ones are stopped and reset once their
    /// job returns, done ones reset recursively.
    fn reset_internal(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(&id) else { return };
        node.lifecycle = Lifecycle::Idle { plan: Plan::None };
        node.job = None;
        node.done_event = DoneEvent::new();
        staging::clear_dir(&self.ctx.nodes_root.join(id.to_string()));
        self.broadcast_state(id);

        for out in self.outputs(id) {
            let Some(phase) = self.nodes.get(&out).map(|n| n.lifecycle.phase()) else {
                continue;
            };
            match phase {
                Phase::Idle => self.on_input_change(out),
                Phase::InProgress => {
                    self.stop_internal(out);
                    if let Some(next) = self.nodes.get_mut(&out) {
                        next.done_event.listen(DoneAction::Reset);
                    }
                }
                Phase::Done => self.reset_internal(out),
            }
        }
    }
}

fn port_name(names: &[String], port: u32) -> Option<&String> {
    usize::try_from(port).ok().and_then(|p| p.checked_sub(1)).and_then(|p| names.get(p))
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
