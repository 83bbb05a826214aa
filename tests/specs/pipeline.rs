// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linear pipelines with real script jobs: the happy path, failures, and
//! skip propagation.

use super::helpers::{next_update, rig, script_node, wait_for_state};
use lattice_core::{EdgeConfig, NodeConfig, NodeState, Plan, Progress};

/// Two script nodes connected by a file edge. Scheduling everything runs
/// them in dependency order and stages the artifact in between.
#[tokio::test]
async fn linear_pipeline_happy_path() {
    let rig = rig();
    let producer = rig
        .engine
        .add_node(NodeConfig {
            outputs: vec!["out/".into()],
            ..script_node("#!/bin/sh\nmkdir -p out\necho a > out/a.txt\n")
        })
        .unwrap();
    let consumer = rig
        .engine
        .add_node(NodeConfig {
            inputs: vec!["in/".into()],
            ..script_node("#!/bin/sh\ncat in/a.txt\n")
        })
        .unwrap();
    rig.engine.connect(EdgeConfig::file(producer, 1, consumer, 1)).unwrap();

    let mut sub = rig.engine.subscribe();
    rig.engine.schedule_all();

    assert_eq!(
        next_update(&mut sub).await,
        (producer, NodeState::InProgress { status: Progress::Running })
    );
    assert_eq!(
        next_update(&mut sub).await,
        (producer, NodeState::Done { error: None, stopped: false, skipped: false, from_idle: false })
    );
    assert_eq!(
        next_update(&mut sub).await,
        (consumer, NodeState::Idle { is_ready: true, plan: Plan::Scheduled })
    );
    assert_eq!(
        next_update(&mut sub).await,
        (consumer, NodeState::InProgress { status: Progress::Running })
    );
    assert_eq!(
        next_update(&mut sub).await,
        (consumer, NodeState::Done { error: None, stopped: false, skipped: false, from_idle: false })
    );

    // The consumer read the staged file.
    let arts = rig.engine.collect_arts(consumer).unwrap();
    assert_eq!(arts.get("stdout").map(String::as_str), Some("a\n"));
}

/// A failing job blocks everything downstream of it.
#[tokio::test]
async fn failure_blocks_downstream() {
    let rig = rig();
    let producer = rig
        .engine
        .add_node(script_node("#!/bin/sh\necho boom >&2\nexit 1\n"))
        .unwrap();
    let consumer = rig.engine.add_node(script_node("#!/bin/sh\ntrue\n")).unwrap();
    rig.engine.connect(EdgeConfig::control(producer, consumer)).unwrap();

    rig.engine.schedule_all();
    wait_for_state(&rig.engine, producer, |s| {
        matches!(s, NodeState::Done { error: Some(_), .. })
    })
    .await;

    // The consumer never started and remains blocked.
    let states = rig.engine.node_states();
    let consumer_state =
        states.iter().find(|s| s.id == consumer).map(|s| s.state.clone()).unwrap();
    assert_eq!(consumer_state, NodeState::Idle { is_ready: false, plan: Plan::Scheduled });
}

/// Skipping a running node lets its successors proceed immediately; the
/// skipped node itself lands in `Done { skipped }` when its job returns.
#[tokio::test]
async fn skip_unblocks_downstream_while_running() {
    let rig = rig();
    let slow = rig.engine.add_node(script_node("#!/bin/sh\nsleep 30\n")).unwrap();
    let fast = rig.engine.add_node(script_node("#!/bin/sh\ntrue\n")).unwrap();
    rig.engine.connect(EdgeConfig::control(slow, fast)).unwrap();

    rig.engine.schedule_all();
    wait_for_state(&rig.engine, slow, NodeState::is_in_progress).await;

    rig.engine.skip_node(slow).unwrap();
    wait_for_state(&rig.engine, fast, NodeState::is_done).await;

    // Take the skipped node's job down and observe the final state.
    rig.engine.stop_node(slow).unwrap();
    wait_for_state(&rig.engine, slow, |s| {
        matches!(s, NodeState::Done { skipped: false, stopped: true, .. })
    })
    .await;
}
