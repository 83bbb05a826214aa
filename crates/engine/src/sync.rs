// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync broadcaster: fan-out of state updates to N subscribers.
//!
//! The registry has its own lock; publication happens while the engine's
//! serializer is held, so every subscriber's channel observes the same total
//! order. Channels are unbounded: the publisher never blocks, and no event
//! is ever dropped for a live subscriber.

use lattice_core::SyncEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Identifier of one sync subscription.
pub type SubscriberId = u64;

#[derive(Default)]
struct Registry {
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, mpsc::UnboundedSender<SyncEvent>>,
}

/// Fan-out of [`SyncEvent`]s to subscribed streams.
#[derive(Default)]
pub struct SyncBroadcaster {
    registry: Mutex<Registry>,
}

impl SyncBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its id and event channel.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::UnboundedReceiver<SyncEvent>) {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        let (tx, rx) = mpsc::unbounded_channel();
        registry.subscribers.insert(id, tx);
        (id, rx)
    }

    /// Remove a subscriber, closing its channel.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.registry.lock().subscribers.remove(&id);
    }

    /// Deliver one event to every subscriber.
    pub fn report(&self, event: SyncEvent) {
        let mut registry = self.registry.lock();
        // A send only fails when the receiver is gone; drop such entries.
        registry.subscribers.retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    /// Drop every subscriber; their channels close after draining.
    pub fn close_all(&self) {
        self.registry.lock().subscribers.clear();
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.registry.lock().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
