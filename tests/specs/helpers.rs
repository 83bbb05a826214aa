// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scaffolding for the scenario tests.

use lattice_core::{JobSpec, NodeConfig, NodeId, NodeState, SyncEvent};
use lattice_engine::{Engine, EngineOptions, SyncSubscription};
use lattice_jobs::{register_builtins, FakeJobFactory, JobRegistry};
use std::sync::Arc;
use std::time::Duration;

pub struct Rig {
    pub engine: Engine,
    pub factory: FakeJobFactory,
    pub dir: tempfile::TempDir,
}

/// Engine with the builtin job types plus the controllable `fake` kind.
pub fn rig() -> Rig {
    let factory = FakeJobFactory::new();
    let mut registry = JobRegistry::new();
    register_builtins(&mut registry);
    factory.register(&mut registry);

    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(
        Arc::new(registry),
        EngineOptions {
            nodes_root: dir.path().join("nodes"),
            save_path: dir.path().join("graph.json"),
        },
    );
    Rig { engine, factory, dir }
}

pub fn script_node(source: &str) -> NodeConfig {
    NodeConfig {
        job: JobSpec::new("script", serde_json::json!({ "source": source })),
        ..NodeConfig::default()
    }
}

pub fn fake_node() -> NodeConfig {
    NodeConfig { job: JobSpec::new("fake", serde_json::Value::Null), ..NodeConfig::default() }
}

/// Next `UpdateState` on the stream, skipping other event types.
pub async fn next_update(sub: &mut SyncSubscription) -> (NodeId, NodeState) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), sub.events.recv())
            .await
            .expect("timed out waiting for a sync event")
            .expect("sync stream closed");
        if let SyncEvent::UpdateState { id, state } = event {
            return (id, state);
        }
    }
}

/// Poll until the node's state satisfies the predicate.
pub async fn wait_for_state(engine: &Engine, id: NodeId, pred: impl Fn(&NodeState) -> bool) {
    for _ in 0..500 {
        if engine.node_states().iter().any(|s| s.id == id && pred(&s.state)) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("node {id} never reached the expected state: {:?}", engine.node_states());
}
