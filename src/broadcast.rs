//! Explicitly-scoped stop signal for the tile grid.
//!
//! Instead of a process-global notification center, the session core owns
//! one [`StopBroadcast`] per play-through. It holds weak references to its
//! listeners, so a discarded tile unsubscribes itself by being dropped and
//! teardown stays explicit.

use std::sync::{Mutex, Weak};

use tracing::{debug, instrument};

/// Receiver side of the stop signal.
pub trait StopListener: Send + Sync {
    /// Halts the listener: cancel pending timers, enter the terminal state.
    /// Must be idempotent.
    fn on_stop_signal(&self);
}

/// Many-listener, synchronous stop signal.
///
/// Publishing invokes every live listener exactly once, on the caller's
/// thread, before `publish` returns. Subscriptions survive a publish; a
/// tile instance is discarded after stopping, not reused, so the registry
/// is only cleared when the grid is rebuilt.
#[derive(Default)]
pub struct StopBroadcast {
    listeners: Mutex<Vec<Weak<dyn StopListener>>>,
}

impl StopBroadcast {
    /// Creates an empty broadcast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for subsequent stop signals.
    pub fn subscribe(&self, listener: Weak<dyn StopListener>) {
        self.listeners.lock().unwrap().push(listener);
    }

    /// Invokes `on_stop_signal` on every currently subscribed, still-alive
    /// listener. Dead weak references are skipped.
    #[instrument(skip(self))]
    pub fn publish(&self) {
        // Snapshot the registry so listener callbacks never run under the
        // registry lock.
        let listeners: Vec<Weak<dyn StopListener>> = self.listeners.lock().unwrap().clone();
        let mut delivered = 0usize;
        for listener in &listeners {
            if let Some(listener) = listener.upgrade() {
                listener.on_stop_signal();
                delivered += 1;
            }
        }
        debug!(delivered, registered = listeners.len(), "stop signal published");
    }

    /// Drops every subscription. Used when the grid is rebuilt.
    pub fn clear(&self) {
        self.listeners.lock().unwrap().clear();
    }

    /// Number of registered subscriptions, live or dead.
    pub fn len(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// True when no subscriptions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for StopBroadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopBroadcast")
            .field("listeners", &self.len())
            .finish()
    }
}
