// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job type registry.
//!
//! Maps a [`JobSpec`] kind to a constructor. Registration happens once per
//! type at process start; `create` hands the engine a fresh job per run.

use crate::job::Job;
use lattice_core::JobSpec;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors from job construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown job type: {0}")]
    Unknown(String),

    #[error("job creation failed: {0}")]
    Creation(String),
}

type Constructor =
    Box<dyn Fn(&serde_json::Value) -> Result<Arc<dyn Job>, RegistryError> + Send + Sync>;

/// Registry of job constructors keyed by spec kind.
#[derive(Default)]
pub struct JobRegistry {
    constructors: HashMap<String, Constructor>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `kind`. A later registration with the same
    /// kind replaces the earlier one.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&serde_json::Value) -> Result<Arc<dyn Job>, RegistryError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        tracing::debug!(kind = %kind, "job type registered");
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Construct a fresh job for the given spec.
    pub fn create(&self, spec: &JobSpec) -> Result<Arc<dyn Job>, RegistryError> {
        let constructor = self
            .constructors
            .get(&spec.kind)
            .ok_or_else(|| RegistryError::Unknown(spec.kind.clone()))?;
        constructor(&spec.payload)
    }

    /// Registered kinds, for logging.
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

/// Deserialize a typed payload out of a job spec's `payload` value.
pub fn payload<C: DeserializeOwned>(value: &serde_json::Value) -> Result<C, RegistryError> {
    serde_json::from_value(value.clone()).map_err(|e| RegistryError::Creation(e.to_string()))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
