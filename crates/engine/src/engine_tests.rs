// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lattice_core::{GraphConfig, JobSpec, NodeState, Progress};
use lattice_jobs::FakeJobFactory;
use std::time::Duration;

struct Rig {
    engine: Engine,
    factory: FakeJobFactory,
    dir: tempfile::TempDir,
}

fn rig() -> Rig {
    let factory = FakeJobFactory::new();
    let mut registry = JobRegistry::new();
    factory.register(&mut registry);
    let dir = tempfile::tempdir().unwrap();
    let options = EngineOptions {
        nodes_root: dir.path().join("nodes"),
        save_path: dir.path().join("graph.json"),
    };
    Rig { engine: Engine::new(Arc::new(registry), options), factory, dir }
}

fn fake_node() -> NodeConfig {
    NodeConfig { job: JobSpec::new("fake", serde_json::Value::Null), ..NodeConfig::default() }
}

async fn next_update(sub: &mut SyncSubscription) -> (NodeId, NodeState) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), sub.events.recv())
            .await
            .expect("timed out waiting for sync event")
            .expect("sync stream closed");
        if let SyncEvent::UpdateState { id, state } = event {
            return (id, state);
        }
    }
}

async fn wait_for_state(engine: &Engine, id: NodeId, pred: impl Fn(&NodeState) -> bool) {
    for _ in 0..250 {
        if engine.node_states().iter().any(|s| s.id == id && pred(&s.state)) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("node {id} never reached the expected state: {:?}", engine.node_states());
}

#[tokio::test]
async fn pipeline_runs_to_completion_in_order() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();

    let mut sub = rig.engine.subscribe();
    assert!(matches!(sub.snapshot.last(), Some(SyncEvent::InitDone)));

    rig.engine.schedule_all();
    assert_eq!(
        next_update(&mut sub).await,
        (a, NodeState::InProgress { status: Progress::Running })
    );

    rig.factory.handles()[0].finish_ok();
    let (id, state) = next_update(&mut sub).await;
    assert_eq!(id, a);
    assert_eq!(
        state,
        NodeState::Done { error: None, stopped: false, skipped: false, from_idle: false }
    );

    assert_eq!(
        next_update(&mut sub).await,
        (b, NodeState::Idle { is_ready: true, plan: Plan::Scheduled })
    );
    assert_eq!(
        next_update(&mut sub).await,
        (b, NodeState::InProgress { status: Progress::Running })
    );

    rig.factory.handles()[1].finish_ok();
    let (id, state) = next_update(&mut sub).await;
    assert_eq!(id, b);
    assert!(matches!(state, NodeState::Done { error: None, .. }));
}

#[tokio::test]
async fn failure_blocks_downstream() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();

    let mut sub = rig.engine.subscribe();
    rig.engine.schedule_all();
    next_update(&mut sub).await; // a running

    rig.factory.handles()[0].finish_err("boom");
    let (id, state) = next_update(&mut sub).await;
    assert_eq!(id, a);
    assert_eq!(
        state,
        NodeState::Done { error: Some("boom".into()), stopped: false, skipped: false, from_idle: false }
    );

    // The input-change broadcast shows the successor still blocked.
    assert_eq!(
        next_update(&mut sub).await,
        (b, NodeState::Idle { is_ready: false, plan: Plan::Scheduled })
    );
    assert_eq!(rig.factory.created(), 1);
}

#[tokio::test]
async fn skip_propagates_readiness_before_the_job_returns() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();

    rig.engine.run_node(a).unwrap();
    rig.engine.schedule_node(b).unwrap(); // not ready yet: planned

    rig.engine.skip_node(a).unwrap();
    // The successor starts while a's job is still in flight.
    wait_for_state(&rig.engine, b, NodeState::is_in_progress).await;
    assert_eq!(rig.factory.created(), 2);

    rig.factory.handles()[0].finish_ok();
    wait_for_state(&rig.engine, a, |s| {
        matches!(s, NodeState::Done { skipped: true, stopped: false, .. })
    })
    .await;
}

#[tokio::test]
async fn cascading_reset_across_a_running_successor() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    let c = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();
    rig.engine.connect(EdgeConfig::control(b, c)).unwrap();

    rig.engine.schedule_all();
    rig.factory.handles()[0].finish_ok();
    wait_for_state(&rig.engine, b, NodeState::is_in_progress).await;
    rig.factory.handles()[1].finish_ok();
    wait_for_state(&rig.engine, c, NodeState::is_in_progress).await;

    // a and b are done, c is running. Reset the root.
    rig.engine.reset_node(a).unwrap();
    wait_for_state(&rig.engine, a, NodeState::is_idle).await;
    wait_for_state(&rig.engine, b, NodeState::is_idle).await;

    // c was stopped; once its job reports back it auto-resets to idle.
    wait_for_state(&rig.engine, c, NodeState::is_idle).await;
    assert_eq!(rig.factory.handles()[2].kill_count(), 1);
}

#[tokio::test]
async fn concurrent_adds_get_distinct_ids() {
    let rig = rig();
    let mut sub = rig.engine.subscribe();

    let first = {
        let engine = rig.engine.clone();
        tokio::spawn(async move { engine.add_node(fake_node()).unwrap() })
    };
    let second = {
        let engine = rig.engine.clone();
        tokio::spawn(async move { engine.add_node(fake_node()).unwrap() })
    };
    let (first, second) = (first.await.unwrap(), second.await.unwrap());
    assert_ne!(first, second);

    let states = rig.engine.node_states();
    assert_eq!(states.len(), 2);

    // Each new node appears on the stream exactly once.
    let (x, _) = next_update(&mut sub).await;
    let (y, _) = next_update(&mut sub).await;
    let mut seen = [x, y];
    seen.sort();
    let mut expected = [first, second];
    expected.sort();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn artifacts_stay_collectable_until_reset() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();

    rig.engine.run_node(a).unwrap();
    rig.factory.handles()[0].set_artifact("answer", "42");
    rig.factory.handles()[0].finish_ok();
    wait_for_state(&rig.engine, a, NodeState::is_done).await;

    let arts = rig.engine.collect_arts(a).unwrap();
    assert_eq!(arts.get("answer").map(String::as_str), Some("42"));

    rig.engine.reset_node(a).unwrap();
    assert!(rig.engine.collect_arts(a).unwrap().is_empty());
}

#[tokio::test]
async fn graph_replacement_closes_streams_after_a_reset_marker() {
    let rig = rig();
    rig.engine.add_node(fake_node()).unwrap();

    let mut sub = rig.engine.subscribe();
    rig.engine.new_graph();

    let mut saw_reset = false;
    while let Some(event) = sub.events.recv().await {
        if event == SyncEvent::Reset {
            saw_reset = true;
        }
    }
    assert!(saw_reset, "stream should deliver the reset marker before closing");
    assert!(sub.cancelled.is_cancelled());
}

#[tokio::test]
async fn save_new_load_roundtrip_is_identical() {
    let rig = rig();
    let a = rig.engine.add_node(NodeConfig { outputs: vec!["out".into()], ..fake_node() }).unwrap();
    let b = rig.engine.add_node(NodeConfig { inputs: vec!["in".into()], ..fake_node() }).unwrap();
    rig.engine.connect(EdgeConfig::file(a, 1, b, 1)).unwrap();

    let path = rig.dir.path().join("graph.json");
    let saved: GraphConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    rig.engine.new_graph();
    assert!(rig.engine.node_states().is_empty());

    rig.engine.load(&path).unwrap();
    rig.engine.save(Some(&path)).unwrap();
    let reloaded: GraphConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved, reloaded);
    assert_eq!(rig.engine.node_states().len(), 2);
}

#[tokio::test]
async fn staging_failure_surfaces_as_done_error_and_error_event() {
    let rig = rig();
    let a = rig.engine.add_node(NodeConfig { outputs: vec!["out".into()], ..fake_node() }).unwrap();
    let b = rig.engine.add_node(NodeConfig { inputs: vec!["in".into()], ..fake_node() }).unwrap();
    rig.engine.connect(EdgeConfig::file(a, 1, b, 1)).unwrap();

    let mut sub = rig.engine.subscribe();
    rig.engine.schedule_all();
    // a runs but never produces its declared output file.
    rig.factory.handles()[0].finish_ok();

    wait_for_state(&rig.engine, b, |s| {
        matches!(s, NodeState::Done { error: Some(e), .. } if e.contains("staging failed"))
    })
    .await;

    let mut saw_error_event = false;
    while let Ok(event) = sub.events.try_recv() {
        if matches!(event, SyncEvent::Error { .. }) {
            saw_error_event = true;
        }
    }
    assert!(saw_error_event);
}

#[tokio::test]
async fn node_operations_on_unknown_ids_are_not_found() {
    let rig = rig();
    let missing = NodeId(41);
    assert!(matches!(rig.engine.run_node(missing), Err(EngineError::NotFound(_))));
    assert!(matches!(rig.engine.stop_node(missing), Err(EngineError::NotFound(_))));
    assert!(matches!(rig.engine.collect_arts(missing), Err(EngineError::NotFound(_))));
    assert!(matches!(rig.engine.delete_node(missing), Err(EngineError::NotFound(_))));
}
