// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cascading reset, including across a still-running successor.

use super::helpers::{fake_node, rig, wait_for_state};
use lattice_core::{EdgeConfig, NodeState};

#[tokio::test]
async fn reset_returns_a_done_chain_to_idle() {
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
    rig.factory.handles()[2].finish_ok();
    wait_for_state(&rig.engine, c, NodeState::is_done).await;

    rig.engine.reset_node(a).unwrap();
    for id in [a, b, c] {
        wait_for_state(&rig.engine, id, NodeState::is_idle).await;
    }
}

#[tokio::test]
async fn reset_stops_and_then_resets_a_running_successor() {
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

    // c is still running when the root resets.
    rig.engine.reset_node(a).unwrap();
    wait_for_state(&rig.engine, a, NodeState::is_idle).await;
    wait_for_state(&rig.engine, b, NodeState::is_idle).await;

    // c was stopped; once its job returns it resets automatically.
    wait_for_state(&rig.engine, c, NodeState::is_idle).await;
    assert_eq!(rig.factory.handles()[2].kill_count(), 1);
}

#[tokio::test]
async fn reset_clears_the_working_directory() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();

    rig.engine.run_node(a).unwrap();
    rig.factory.handles()[0].finish_ok();
    wait_for_state(&rig.engine, a, NodeState::is_done).await;

    let node_dir = rig.dir.path().join("nodes").join("1");
    assert!(node_dir.is_dir());

    rig.engine.reset_node(a).unwrap();
    assert!(!node_dir.exists());
}
