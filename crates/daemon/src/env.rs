// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment configuration for the daemon.

use std::path::PathBuf;
use std::time::Duration;

/// Default RPC port.
pub const DEFAULT_PORT: u16 = 9000;

/// How long to wait for a client to send its request.
pub fn request_timeout() -> Duration {
    std::env::var("LATTICE_IPC_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(10))
}

/// Data directory: `$LATTICE_HOME`, or `~/.lattice`.
///
/// Holds the per-node working directories (`nodes/<id>/`) and the default
/// graph save path (`graph.json`).
pub fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("LATTICE_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".lattice")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
