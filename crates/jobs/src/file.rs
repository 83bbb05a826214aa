// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File job: materialize a fixed file in the working directory.

use crate::job::{Job, JobError, RunContext};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

pub const FILE_FILENAME: &str = "file";

/// Payload of a `file` job spec.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// Lines written to the output file.
    pub data: Vec<String>,
}

#[derive(Debug)]
pub struct FileJob {
    config: FileConfig,
}

impl FileJob {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Job for FileJob {
    async fn run(&self, ctx: RunContext) -> Result<(), JobError> {
        let data = self.config.data.join("\n") + "\n";
        tokio::fs::write(ctx.dir.join(FILE_FILENAME), data.as_bytes()).await?;
        Ok(())
    }

    fn kill(&self) {}

    fn collect_artifacts(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
