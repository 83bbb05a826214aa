// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge bookkeeping and linearization of concurrent commands.

use super::helpers::{fake_node, next_update, rig};
use lattice_core::{EdgeConfig, SyncEvent};
use lattice_engine::EngineError;

/// Connecting the same edge twice: the first succeeds, the second is
/// rejected without producing any sync traffic.
#[tokio::test]
async fn duplicate_connect_is_rejected_silently() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();

    let mut sub = rig.engine.subscribe();
    let edge = EdgeConfig::control(a, b);
    rig.engine.connect(edge.clone()).unwrap();
    // The successful connect re-announces the target node.
    let (id, _) = next_update(&mut sub).await;
    assert_eq!(id, b);

    assert!(matches!(rig.engine.connect(edge), Err(EngineError::DuplicateEdge(_))));
    // Nothing new on the stream for the failure.
    assert!(sub.events.try_recv().is_err());
}

#[tokio::test]
async fn disconnect_restores_the_previous_edge_set() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    let edge = EdgeConfig::control(a, b);

    rig.engine.connect(edge.clone()).unwrap();
    rig.engine.disconnect(edge.clone()).unwrap();

    // Both nodes are edge-free: deletion succeeds.
    rig.engine.delete_node(a).unwrap();
    rig.engine.delete_node(b).unwrap();
    assert!(rig.engine.node_states().is_empty());
}

/// Two clients adding nodes at the same time: both succeed with distinct
/// ids, and each node is announced exactly once.
#[tokio::test]
async fn concurrent_adds_are_linearized() {
    let rig = rig();
    let mut sub = rig.engine.subscribe();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let engine = rig.engine.clone();
            tokio::spawn(async move { engine.add_node(fake_node()).unwrap() })
        })
        .collect();
    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.sort();
    assert_ne!(ids[0], ids[1]);

    let states = rig.engine.node_states();
    assert_eq!(states.len(), 2);

    let mut announced = vec![next_update(&mut sub).await.0, next_update(&mut sub).await.0];
    announced.sort();
    assert_eq!(announced, ids);
    assert!(matches!(sub.events.try_recv(), Err(_)));
}

#[tokio::test]
async fn subscribers_all_see_the_same_order() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();

    let mut first = rig.engine.subscribe();
    let mut second = rig.engine.subscribe();

    rig.engine.schedule_all();
    rig.factory.handles()[0].finish_ok();

    let mut seen_first = Vec::new();
    let mut seen_second = Vec::new();
    for _ in 0..4 {
        seen_first.push(next_update(&mut first).await);
        seen_second.push(next_update(&mut second).await);
    }
    assert_eq!(seen_first, seen_second);
}

#[tokio::test]
async fn snapshot_replays_nodes_then_edges_then_done() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();

    let sub = rig.engine.subscribe();
    let kinds: Vec<_> = sub.snapshot.iter().map(SyncEvent::name).collect();
    assert_eq!(kinds, vec!["init_node", "init_node", "init_edge", "init_done"]);
}
