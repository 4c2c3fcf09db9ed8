//! Tab lifecycle events published by a tab host.
//!
//! A host emits navigation updates and removals through [`TabEvents`];
//! watchers subscribe to the buses they care about. Built on
//! [`tokio::sync::broadcast`]: holding a receiver is a registered
//! listener, dropping it deregisters the listener.

use tokio::sync::broadcast;

/// Identifier of a browser tab.
pub type TabId = u64;

/// Navigation status reported once a page has finished loading.
pub const STATUS_COMPLETE: &str = "complete";

/// A tab finished (or started) a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabUpdate {
    pub tab_id: TabId,
    pub status: String,
    pub url: String,
    pub title: String,
}

/// The two event buses of a tab host.
#[derive(Debug)]
pub struct TabEvents {
    updated: broadcast::Sender<TabUpdate>,
    removed: broadcast::Sender<TabId>,
}

impl TabEvents {
    /// Create both buses with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (updated, _) = broadcast::channel(capacity);
        let (removed, _) = broadcast::channel(capacity);
        Self { updated, removed }
    }

    /// Publish a navigation update.
    /// Returns the number of listeners that will see it.
    pub fn emit_updated(&self, update: TabUpdate) -> usize {
        self.updated.send(update).unwrap_or(0)
    }

    /// Publish a tab removal.
    /// Returns the number of listeners that will see it.
    pub fn emit_removed(&self, tab_id: TabId) -> usize {
        self.removed.send(tab_id).unwrap_or(0)
    }

    /// Register a navigation listener. Future events only.
    pub fn on_updated(&self) -> broadcast::Receiver<TabUpdate> {
        self.updated.subscribe()
    }

    /// Register a removal listener. Future events only.
    pub fn on_removed(&self) -> broadcast::Receiver<TabId> {
        self.removed.subscribe()
    }

    /// Currently registered `(update, removal)` listeners.
    pub fn listener_counts(&self) -> (usize, usize) {
        (self.updated.receiver_count(), self.removed.receiver_count())
    }
}

impl Default for TabEvents {
    fn default() -> Self {
        Self::new(16)
    }
}
