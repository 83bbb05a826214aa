// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration of the builtin job types.

use crate::daemon::DaemonJob;
use crate::file::FileJob;
use crate::monitor::MonitorJob;
use crate::registry::{payload, JobRegistry};
use crate::script::ScriptJob;
use std::sync::Arc;

/// Register every builtin job type. Called once at daemon start.
pub fn register_builtins(registry: &mut JobRegistry) {
    registry.register("script", |value| Ok(Arc::new(ScriptJob::new(payload(value)?))));
    registry.register("file", |value| Ok(Arc::new(FileJob::new(payload(value)?))));
    registry.register("daemon", |value| Ok(Arc::new(DaemonJob::new(payload(value)?))));
    registry.register("monitor", |_value| Ok(Arc::new(MonitorJob::new())));
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
