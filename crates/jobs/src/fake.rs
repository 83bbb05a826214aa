// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controllable job for engine tests.
//!
//! A `FakeJob` blocks until its [`FakeHandle`] finishes it (or kills it),
//! letting tests hold nodes in flight and release them deterministically.

use crate::job::{Job, JobError, RunContext};
use crate::registry::JobRegistry;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
enum FakeOutcome {
    Ok,
    Err(String),
    Killed,
}

#[derive(Debug, Default)]
struct FakeInner {
    notify: Notify,
    outcome: Mutex<Option<FakeOutcome>>,
    kills: AtomicUsize,
    arts: Mutex<HashMap<String, String>>,
}

/// The job half: registered in the engine, blocks in `run`.
#[derive(Debug)]
pub struct FakeJob {
    inner: Arc<FakeInner>,
}

/// The test half: finishes or inspects a created job.
#[derive(Clone)]
pub struct FakeHandle {
    inner: Arc<FakeInner>,
}

impl FakeHandle {
    /// Let the job's `run` return `Ok`.
    pub fn finish_ok(&self) {
        self.finish(FakeOutcome::Ok);
    }

    /// Let the job's `run` return an error with this message.
    pub fn finish_err(&self, message: impl Into<String>) {
        self.finish(FakeOutcome::Err(message.into()));
    }

    fn finish(&self, outcome: FakeOutcome) {
        *self.inner.outcome.lock() = Some(outcome);
        self.inner.notify.notify_one();
    }

    /// How many times the engine killed this job.
    pub fn kill_count(&self) -> usize {
        self.inner.kills.load(Ordering::SeqCst)
    }

    /// Plant an artifact that `collect_artifacts` will report.
    pub fn set_artifact(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.arts.lock().insert(key.into(), value.into());
    }
}

#[async_trait]
impl Job for FakeJob {
    async fn run(&self, _ctx: RunContext) -> Result<(), JobError> {
        loop {
            if let Some(outcome) = self.inner.outcome.lock().take() {
                return match outcome {
                    FakeOutcome::Ok => Ok(()),
                    FakeOutcome::Err(message) => Err(JobError::Other(message)),
                    FakeOutcome::Killed => Err(JobError::Killed),
                };
            }
            self.inner.notify.notified().await;
        }
    }

    fn kill(&self) {
        self.inner.kills.fetch_add(1, Ordering::SeqCst);
        *self.inner.outcome.lock() = Some(FakeOutcome::Killed);
        self.inner.notify.notify_one();
    }

    fn collect_artifacts(&self) -> HashMap<String, String> {
        self.inner.arts.lock().clone()
    }
}

/// Registers the `fake` job kind and exposes a handle per created job, in
/// creation order.
#[derive(Clone, Default)]
pub struct FakeJobFactory {
    handles: Arc<Mutex<Vec<FakeHandle>>>,
}

impl FakeJobFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registry: &mut JobRegistry) {
        let handles = Arc::clone(&self.handles);
        registry.register("fake", move |_value| {
            let inner = Arc::new(FakeInner::default());
            handles.lock().push(FakeHandle { inner: Arc::clone(&inner) });
            Ok(Arc::new(FakeJob { inner }))
        });
    }

    /// Handles for every job created so far, in creation order.
    pub fn handles(&self) -> Vec<FakeHandle> {
        self.handles.lock().clone()
    }

    /// Number of jobs created so far.
    pub fn created(&self) -> usize {
        self.handles.lock().len()
    }
}
