// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The full wire path: framed requests against a live daemon listener.

use lattice_core::{ErrorKind, JobSpec, NodeConfig, NodeId, SyncEvent};
use lattice_daemon::serve;
use lattice_engine::{Engine, EngineOptions};
use lattice_jobs::{register_builtins, JobRegistry};
use lattice_wire::{self as wire, Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

async fn start() -> (SocketAddr, CancellationToken, tempfile::TempDir) {
    let mut registry = JobRegistry::new();
    register_builtins(&mut registry);
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(
        Arc::new(registry),
        EngineOptions {
            nodes_root: dir.path().join("nodes"),
            save_path: dir.path().join("graph.json"),
        },
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(serve(listener, engine, shutdown.clone()));
    (addr, shutdown, dir)
}

async fn send(addr: SocketAddr, request: Request) -> Response {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    wire::write_request(&mut stream, &request).await.unwrap();
    wire::read_response(&mut stream, Duration::from_secs(5)).await.unwrap()
}

fn script_node(source: &str) -> NodeConfig {
    NodeConfig {
        job: JobSpec::new("script", serde_json::json!({ "source": source })),
        ..NodeConfig::default()
    }
}

#[tokio::test]
async fn a_full_session_over_the_wire() {
    let (addr, _shutdown, _dir) = start().await;

    assert_eq!(send(addr, Request::Ping).await, Response::Ok);

    // Build a one-node graph.
    let response =
        send(addr, Request::NodeAdd { config: script_node("#!/bin/sh\necho hi\n") }).await;
    let id = match response {
        Response::NodeId { id } => id,
        other => panic!("unexpected response {other:?}"),
    };
    assert_eq!(id, NodeId(1));

    // Subscribe, then run the node and watch it complete.
    let mut sync = TcpStream::connect(addr).await.unwrap();
    wire::write_request(&mut sync, &Request::GraphSync).await.unwrap();
    assert_eq!(
        wire::read_response(&mut sync, Duration::from_secs(5)).await.unwrap(),
        Response::Ok
    );
    loop {
        if wire::read_event(&mut sync).await.unwrap() == SyncEvent::InitDone {
            break;
        }
    }

    assert_eq!(send(addr, Request::NodeRun { id }).await, Response::Ok);
    let mut saw_done = false;
    for _ in 0..4 {
        match wire::read_event(&mut sync).await.unwrap() {
            SyncEvent::UpdateState { id: updated, state } if updated == id && state.is_done() => {
                saw_done = true;
                break;
            }
            _ => {}
        }
    }
    assert!(saw_done, "expected the run to reach done over the stream");

    // Artifacts are collectable over the wire after completion.
    match send(addr, Request::NodeArts { id }).await {
        Response::Arts { arts } => {
            assert_eq!(arts.get("stdout").map(String::as_str), Some("hi\n"));
        }
        other => panic!("unexpected response {other:?}"),
    }
}

#[tokio::test]
async fn invalid_operations_come_back_as_typed_errors() {
    let (addr, _shutdown, _dir) = start().await;

    match send(addr, Request::NodeRun { id: NodeId(5) }).await {
        Response::Error { kind, .. } => assert_eq!(kind, ErrorKind::NotFound),
        other => panic!("unexpected response {other:?}"),
    }

    match send(
        addr,
        Request::NodeAdd {
            config: NodeConfig {
                job: JobSpec::new("no-such-kind", serde_json::Value::Null),
                ..NodeConfig::default()
            },
        },
    )
    .await
    {
        // Adding is fine; the unknown kind only fails when the node runs.
        Response::NodeId { id } => {
            match send(addr, Request::NodeRun { id }).await {
                Response::Error { kind, .. } => assert_eq!(kind, ErrorKind::UnknownJobType),
                other => panic!("unexpected response {other:?}"),
            }
        }
        other => panic!("unexpected response {other:?}"),
    }
}
