// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon job: start a long-lived process and supervise it.
//!
//! The three user-provided snippets (`run`, `status`, `shutdown`) are
//! rendered into a generated supervisor script. The script backgrounds the
//! process, records `PID=`/`STDOUT=`/`STDERR=` into an `info` file (consumed
//! by `monitor` jobs downstream), then polls `status` until it fails or the
//! job is killed.

use crate::arts::Artifacts;
use crate::command::Subprocess;
use crate::job::{Job, JobError, RunContext};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;

pub const DAEMON_SCRIPT_FILENAME: &str = ".script";

const DAEMON_SCRIPT_FORMAT: &str = r#"#!/bin/sh
set -e

mkdir -p logs

( %run% ) >logs/stdout 2>logs/stderr &
PID=$!

cat >info <<EOF
PID=$PID
STDOUT="$(pwd)/logs/stdout"
STDERR="$(pwd)/logs/stderr"
EOF

trap '%shutdown%' TERM INT

while %status%; do
    sleep 1
done
"#;

/// Payload of a `daemon` job spec.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Command that starts the daemonized process.
    pub run: String,
    /// Command that exits 0 while the process is healthy.
    pub status: String,
    /// Command that shuts the process down.
    pub shutdown: String,
}

#[derive(Debug)]
pub struct DaemonJob {
    source: String,
    proc: Subprocess,
    arts: Artifacts,
}

impl DaemonJob {
    pub fn new(config: DaemonConfig) -> Self {
        let source = DAEMON_SCRIPT_FORMAT
            .replace("%run%", &config.run)
            .replace("%status%", &config.status)
            .replace("%shutdown%", &config.shutdown);
        Self { source, proc: Subprocess::new(), arts: Artifacts::new() }
    }
}

#[async_trait]
impl Job for DaemonJob {
    async fn run(&self, ctx: RunContext) -> Result<(), JobError> {
        let path = ctx.dir.join(DAEMON_SCRIPT_FILENAME);
        tokio::fs::write(&path, self.source.as_bytes()).await?;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;

        self.arts.reset(HashMap::from([
            ("script".to_string(), self.source.clone()),
            ("started_at".to_string(), chrono::Local::now().to_rfc3339()),
        ]));

        let result = self.proc.run(&format!("./{DAEMON_SCRIPT_FILENAME}"), &ctx.dir).await;
        self.arts.set("finished_at", chrono::Local::now().to_rfc3339());
        result
    }

    fn kill(&self) {
        self.proc.kill();
    }

    fn collect_artifacts(&self) -> HashMap<String, String> {
        let mut arts = self.arts.snapshot();
        arts.insert("stdout".to_string(), self.proc.stdout());
        arts.insert("stderr".to_string(), self.proc.stderr());
        arts
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
