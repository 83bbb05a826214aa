// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP listener and connection handling.
//!
//! One framed request per connection. A `GraphSync` request upgrades the
//! connection: after `Response::Ok` the server writes the snapshot, then
//! relays live events until the client disconnects or the graph is
//! replaced. Connections are handled on spawned tasks so the accept loop
//! never blocks on the engine.

use crate::dispatch::{dispatch, Outcome};
use crate::env;
use lattice_engine::Engine;
use lattice_wire::{self as wire, ProtocolError, Response};
use tokio::io::AsyncReadExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Accept connections until `shutdown` fires, then drain in-flight handlers.
pub async fn serve(listener: TcpListener, engine: Engine, shutdown: CancellationToken) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            result = listener.accept() => match result {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "connection accepted");
                    let engine = engine.clone();
                    connections.spawn(async move {
                        if let Err(e) = handle_connection(stream, engine).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept failed"),
            },
        }
    }

    // Stop accepting; let in-flight requests finish.
    drop(listener);
    info!(connections = connections.len(), "draining connections");
    while connections.join_next().await.is_some() {}
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::ConnectionClosed => debug!("client disconnected"),
        ProtocolError::Timeout => debug!("client timed out"),
        _ => error!(error = %e, "connection error"),
    }
}

/// Handle a single client connection: one request, one response — or a
/// long-lived sync stream.
async fn handle_connection(stream: TcpStream, engine: Engine) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();
    let request = wire::read_request(&mut reader, env::request_timeout()).await?;
    info!(request = request.name(), "handling request");

    match dispatch(&engine, request) {
        Outcome::Reply(response) => wire::write_response(&mut writer, &response).await,
        Outcome::Sync => stream_sync(reader, writer, engine).await,
    }
}

/// Send the snapshot, then relay live events.
///
/// The channel closing means the graph was replaced (the `Reset` marker is
/// already queued ahead of the close, so the client sees it first). Client
/// disconnect is detected by the read half going quiet.
async fn stream_sync(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    engine: Engine,
) -> Result<(), ProtocolError> {
    let mut sub = engine.subscribe();

    let result = async {
        wire::write_response(&mut writer, &Response::Ok).await?;
        for event in &sub.snapshot {
            wire::write_event(&mut writer, event).await?;
        }

        let mut probe = [0u8; 1];
        loop {
            tokio::select! {
                biased;
                event = sub.events.recv() => match event {
                    Some(event) => wire::write_event(&mut writer, &event).await?,
                    None => return Ok(()),
                },
                read = reader.read(&mut probe) => match read {
                    // Clients never send on a sync stream; data is ignored,
                    // EOF or error means they are gone.
                    Ok(0) | Err(_) => return Ok(()),
                    Ok(_) => {}
                },
            }
        }
    }
    .await;

    engine.unsubscribe(sub.id);
    result
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
