// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Save / load round-trips and auto-save behavior.

use super::helpers::{fake_node, rig, script_node};
use lattice_core::{EdgeConfig, GraphConfig, NodeConfig};

#[tokio::test]
async fn save_new_load_roundtrip_is_byte_identical() {
    let rig = rig();
    let a = rig
        .engine
        .add_node(NodeConfig { outputs: vec!["out/".into()], ..script_node("#!/bin/sh\ntrue\n") })
        .unwrap();
    let b = rig
        .engine
        .add_node(NodeConfig { inputs: vec!["in/".into()], ..script_node("#!/bin/sh\ntrue\n") })
        .unwrap();
    rig.engine.connect(EdgeConfig::file(a, 1, b, 1)).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();

    let path = rig.dir.path().join("saved.json");
    rig.engine.save(Some(&path)).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    rig.engine.new_graph();
    assert!(rig.engine.node_states().is_empty());

    rig.engine.load(&path).unwrap();
    rig.engine.save(Some(&path)).unwrap();
    let after = std::fs::read_to_string(&path).unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn structural_mutations_auto_save() {
    let rig = rig();
    let path = rig.dir.path().join("graph.json");

    let a = rig.engine.add_node(fake_node()).unwrap();
    let config: GraphConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config.nodes.len(), 1);

    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.connect(EdgeConfig::control(a, b)).unwrap();
    let config: GraphConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config.nodes.len(), 2);
    assert_eq!(config.edges.len(), 1);

    rig.engine.disconnect(EdgeConfig::control(a, b)).unwrap();
    rig.engine.delete_node(b).unwrap();
    let config: GraphConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config.nodes.len(), 1);
    assert!(config.edges.is_empty());
}

#[tokio::test]
async fn loaded_nodes_keep_their_ids_and_edges() {
    let rig = rig();
    let a = rig.engine.add_node(fake_node()).unwrap();
    let b = rig.engine.add_node(fake_node()).unwrap();
    rig.engine.delete_node(a).unwrap();

    let path = rig.dir.path().join("sparse.json");
    rig.engine.save(Some(&path)).unwrap();

    rig.engine.new_graph();
    rig.engine.load(&path).unwrap();

    let states = rig.engine.node_states();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].id, b);
}
