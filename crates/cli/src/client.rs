// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection handling for the `lattice` CLI.

use anyhow::{bail, Context, Result};
use lattice_wire::{self as wire, ProtocolError, Request, Response};
use std::time::Duration;
use tokio::net::TcpStream;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one lattice daemon.
pub struct DaemonClient {
    port: u16,
}

impl DaemonClient {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    async fn connect(&self) -> Result<TcpStream> {
        TcpStream::connect(("127.0.0.1", self.port))
            .await
            .with_context(|| format!("failed to connect to the daemon on port {} (is latticed running?)", self.port))
    }

    /// Send one request and wait for its response.
    pub async fn request(&self, request: Request) -> Result<Response> {
        let mut stream = self.connect().await?;
        wire::write_request(&mut stream, &request).await?;
        let response = wire::read_response(&mut stream, RESPONSE_TIMEOUT).await?;
        Ok(response)
    }

    /// Subscribe to the sync stream and print every event as a JSON line
    /// until the daemon closes the stream.
    pub async fn sync(&self) -> Result<()> {
        let mut stream = self.connect().await?;
        wire::write_request(&mut stream, &Request::GraphSync).await?;
        match wire::read_response(&mut stream, RESPONSE_TIMEOUT).await? {
            Response::Ok => {}
            Response::Error { kind, message } => bail!("sync rejected: {kind}: {message}"),
            other => bail!("unexpected response to sync: {other:?}"),
        }

        loop {
            match wire::read_event(&mut stream).await {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(ProtocolError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }
}
