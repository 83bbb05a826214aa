// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor job: watch a daemon started by an upstream `daemon` node.
//!
//! Reads the staged `info` file (`PID=`/`STDOUT=`/`STDERR=` lines), then
//! polls the recorded pid and mirrors the recorded output files into
//! artifacts until killed. A vanished process ends the run with an error.

use crate::arts::Artifacts;
use crate::job::{Job, JobError, RunContext};
use async_trait::async_trait;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Default, PartialEq)]
struct DaemonInfo {
    pid: Option<i32>,
    stdout: Option<String>,
    stderr: Option<String>,
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s)
}

fn parse_info(data: &str) -> DaemonInfo {
    let mut info = DaemonInfo::default();
    for line in data.lines() {
        let Some((key, value)) = line.split_once('=') else { continue };
        match key {
            "PID" => info.pid = value.parse().ok(),
            "STDOUT" => info.stdout = Some(unquote(value).to_string()),
            "STDERR" => info.stderr = Some(unquote(value).to_string()),
            _ => {}
        }
    }
    info
}

#[derive(Debug, Default)]
pub struct MonitorJob {
    killed: AtomicBool,
    arts: Artifacts,
}

impl MonitorJob {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Job for MonitorJob {
    async fn run(&self, ctx: RunContext) -> Result<(), JobError> {
        let data = tokio::fs::read_to_string(ctx.dir.join("info"))
            .await
            .map_err(|e| JobError::Other(format!("failed to read info file: {e}")))?;
        let info = parse_info(&data);

        self.arts.reset(HashMap::from([(
            "started_at".to_string(),
            chrono::Local::now().to_rfc3339(),
        )]));

        while !self.killed.load(Ordering::SeqCst) {
            if let Some(pid) = info.pid {
                kill(Pid::from_raw(pid), None)
                    .map_err(|e| JobError::Other(format!("process with pid {pid} is gone: {e}")))?;
            }

            if let Some(path) = &info.stdout {
                if let Ok(contents) = tokio::fs::read_to_string(path).await {
                    self.arts.set("stdout", contents);
                }
            }
            if let Some(path) = &info.stderr {
                if let Ok(contents) = tokio::fs::read_to_string(path).await {
                    self.arts.set("stderr", contents);
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }

    fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }

    fn collect_artifacts(&self) -> HashMap<String, String> {
        self.arts.snapshot()
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
