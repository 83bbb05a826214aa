// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script job: write a shell script into the working directory and run it.

use crate::arts::Artifacts;
use crate::command::Subprocess;
use crate::job::{Job, JobError, RunContext};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;

pub const SCRIPT_FILENAME: &str = ".script";

/// Payload of a `script` job spec.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// Full script source, including the shebang line.
    pub source: String,
}

#[derive(Debug)]
pub struct ScriptJob {
    config: ScriptConfig,
    proc: Subprocess,
    arts: Artifacts,
}

impl ScriptJob {
    pub fn new(config: ScriptConfig) -> Self {
        Self { config, proc: Subprocess::new(), arts: Artifacts::new() }
    }
}

#[async_trait]
impl Job for ScriptJob {
    async fn run(&self, ctx: RunContext) -> Result<(), JobError> {
        let path = ctx.dir.join(SCRIPT_FILENAME);
        tokio::fs::write(&path, self.config.source.as_bytes()).await?;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;

        self.arts.reset(HashMap::from([(
            "started_at".to_string(),
            chrono::Local::now().to_rfc3339(),
        )]));

        let result = self.proc.run(&format!("./{SCRIPT_FILENAME}"), &ctx.dir).await;
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
#[path = "script_tests.rs"]
mod tests;
