// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latticed` - the lattice workflow engine daemon.

use clap::Parser;
use lattice_daemon::{env, serve};
use lattice_engine::{Engine, EngineOptions};
use lattice_jobs::{register_builtins, JobRegistry};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "latticed", about = "Lattice workflow engine daemon", version)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = env::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let args = Args::parse();

    let data_dir = env::data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        error!(dir = %data_dir.display(), error = %e, "failed to create data directory");
        return ExitCode::FAILURE;
    }

    let mut registry = JobRegistry::new();
    register_builtins(&mut registry);
    let engine = Engine::new(
        Arc::new(registry),
        EngineOptions {
            nodes_root: data_dir.join("nodes"),
            save_path: data_dir.join("graph.json"),
        },
    );

    let listener = match TcpListener::bind(("0.0.0.0", args.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(port = args.port, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(port = args.port, data_dir = %data_dir.display(), "listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(handle_signals(shutdown.clone()));

    serve(listener, engine, shutdown).await;
    info!("shutdown complete");
    ExitCode::SUCCESS
}

/// First SIGINT starts a graceful shutdown; a second one forces termination.
async fn handle_signals(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("got sigint, shutting down...");
    shutdown.cancel();

    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("got sigint again, stopping");
    std::process::exit(1);
}
