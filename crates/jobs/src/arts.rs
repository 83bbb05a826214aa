// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe artifact map.
//!
//! Jobs record key/value artifacts (timestamps, captured output, rendered
//! scripts) while running; the engine snapshots them on collection. The map
//! has its own lock so a job can update it without touching the engine's
//! serializer.

use parking_lot::Mutex;
use std::collections::HashMap;

/// String-to-string artifact map shared between a running job and collectors.
#[derive(Debug, Default)]
pub struct Artifacts {
    data: Mutex<HashMap<String, String>>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map.
    pub fn reset(&self, data: HashMap<String, String>) {
        *self.data.lock() = data;
    }

    /// Set one entry.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Clone the current contents.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.data.lock().clone()
    }
}

#[cfg(test)]
#[path = "arts_tests.rs"]
mod tests;
