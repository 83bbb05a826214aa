// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lattice` - CLI client for the lattice workflow daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client::DaemonClient;
use lattice_core::{EdgeConfig, NodeConfig, NodeId, Plan};
use lattice_wire::{Request, Response};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lattice", about = "Client for the lattice workflow daemon", version)]
struct Cli {
    /// Daemon port
    #[arg(long, global = true, default_value_t = 9000)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the daemon is up
    Ping,
    /// Replace the current graph with an empty one
    New,
    /// Replace the current graph by loading a saved one
    Load { path: PathBuf },
    /// Save the current graph (to its current path, or to PATH)
    Save { path: Option<PathBuf> },
    /// Stream the snapshot and live updates as JSON lines
    Sync,
    /// Show all node states
    States,
    /// Connect two nodes; give both ports for a file edge
    Connect {
        from: u64,
        to: u64,
        /// 1-indexed output port on the from-node
        #[arg(long)]
        from_port: Option<u32>,
        /// 1-indexed input port on the to-node
        #[arg(long)]
        to_port: Option<u32>,
    },
    /// Remove an edge (same arguments as connect)
    Disconnect {
        from: u64,
        to: u64,
        #[arg(long)]
        from_port: Option<u32>,
        #[arg(long)]
        to_port: Option<u32>,
    },
    /// Run every ready node and plan the rest
    ScheduleAll,
    /// Run a node now (it must be ready)
    Run { id: u64 },
    /// Run a node now, or plan it to run once ready
    Schedule { id: u64 },
    /// Set an idle node's plan
    Plan { id: u64, plan: PlanArg },
    /// Stop a node's running job
    Stop { id: u64 },
    /// Skip a running node (its successors stop waiting for it)
    Skip { id: u64 },
    /// Mark an idle node done without running it
    Done { id: u64 },
    /// Reset a done node and everything downstream of it
    Reset { id: u64 },
    /// Collect a node's artifacts
    Arts { id: u64 },
    /// Add a node from a JSON config
    Add {
        /// Node config as JSON: {"inputs": [..], "outputs": [..], "job": {"kind": .., "payload": ..}}
        config: String,
    },
    /// Replace a node's config (the JSON must carry the node's id)
    Edit { config: String },
    /// Delete a node that has no edges
    Delete { id: u64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanArg {
    None,
    Scheduled,
    Skipped,
}

impl From<PlanArg> for Plan {
    fn from(plan: PlanArg) -> Self {
        match plan {
            PlanArg::None => Plan::None,
            PlanArg::Scheduled => Plan::Scheduled,
            PlanArg::Skipped => Plan::Skipped,
        }
    }
}

fn edge(from: u64, to: u64, from_port: Option<u32>, to_port: Option<u32>) -> EdgeConfig {
    EdgeConfig { from_node_id: NodeId(from), from_port, to_node_id: NodeId(to), to_port }
}

fn parse_config(config: &str) -> Result<NodeConfig> {
    serde_json::from_str(config).context("invalid node config JSON")
}

fn to_request(command: Command) -> Result<Request> {
    Ok(match command {
        Command::Ping => Request::Ping,
        Command::New => Request::GraphNew,
        Command::Load { path } => Request::GraphLoad { path },
        Command::Save { path } => Request::GraphSave { path },
        Command::States => Request::GraphStates,
        Command::Connect { from, to, from_port, to_port } => {
            Request::Connect { edge: edge(from, to, from_port, to_port) }
        }
        Command::Disconnect { from, to, from_port, to_port } => {
            Request::Disconnect { edge: edge(from, to, from_port, to_port) }
        }
        Command::ScheduleAll => Request::ScheduleAll,
        Command::Run { id } => Request::NodeRun { id: NodeId(id) },
        Command::Schedule { id } => Request::NodeSchedule { id: NodeId(id) },
        Command::Plan { id, plan } => Request::NodePlan { id: NodeId(id), plan: plan.into() },
        Command::Stop { id } => Request::NodeStop { id: NodeId(id) },
        Command::Skip { id } => Request::NodeSkip { id: NodeId(id) },
        Command::Done { id } => Request::NodeDone { id: NodeId(id) },
        Command::Reset { id } => Request::NodeReset { id: NodeId(id) },
        Command::Arts { id } => Request::NodeArts { id: NodeId(id) },
        Command::Add { config } => Request::NodeAdd { config: parse_config(&config)? },
        Command::Edit { config } => Request::NodeEdit { config: parse_config(&config)? },
        Command::Delete { id } => Request::NodeDelete { id: NodeId(id) },
        Command::Sync => bail!("sync is streamed, not a plain request"),
    })
}

fn render(response: Response) -> Result<()> {
    match response {
        Response::Ok => println!("ok"),
        Response::NodeId { id } => println!("{id}"),
        Response::Arts { arts } => {
            let mut entries: Vec<_> = arts.into_iter().collect();
            entries.sort();
            for (key, value) in entries {
                println!("{key}={value}");
            }
        }
        Response::States { states } => {
            for status in states {
                println!("{}\t{}", status.id, status.state);
            }
        }
        Response::Error { kind, message } => bail!("{kind}: {message}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(cli.port);

    match cli.command {
        Command::Sync => client.sync().await,
        command => {
            let request = to_request(command)?;
            render(client.request(request).await?)
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
