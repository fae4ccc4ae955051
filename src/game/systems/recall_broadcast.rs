//! Recall Broadcast
//!
//! Publish/subscribe point announcing that an anchor finished its recall.
//! Notifications carry no payload; subscribers are zero-argument callbacks.
//!
//! The launcher that owns an anchor learns about completion through its own
//! one-shot channel, so this broadcast is for everything else that cares
//! (doors, HUD, audio). A process-wide instance is available through
//! [`RecallBroadcast::global`]; isolated instances can be created for tests
//! or for hosts that run several independent rigs.
//!
//! # Lifecycle
//!
//! The subscriber registry is created on the first `subscribe` and dropped
//! again when the last subscriber leaves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Token returned by [`RecallBroadcast::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    handlers: Vec<(SubscriptionId, Handler)>,
}

/// Cloneable handle to a recall broadcast channel.
#[derive(Clone, Default)]
pub struct RecallBroadcast {
    registry: Arc<Mutex<Option<Registry>>>,
    // Outlives registry teardown so ids are never reused
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for RecallBroadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecallBroadcast")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

static GLOBAL: OnceLock<RecallBroadcast> = OnceLock::new();

impl RecallBroadcast {
    /// Create an isolated channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide channel.
    pub fn global() -> &'static RecallBroadcast {
        GLOBAL.get_or_init(RecallBroadcast::new)
    }

    /// Register a handler, initializing the registry if needed.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut guard = self.registry.lock();
        let registry = guard.get_or_insert_with(Registry::default);
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        registry.handlers.push((id, Arc::new(handler)));
        tracing::debug!(
            "[broadcast] subscribed {:?} ({} total)",
            id,
            registry.handlers.len()
        );
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    ///
    /// Removing the last handler tears the registry down.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.registry.lock();
        let Some(registry) = guard.as_mut() else {
            return false;
        };
        let before = registry.handlers.len();
        registry.handlers.retain(|(sub, _)| *sub != id);
        let removed = registry.handlers.len() != before;
        if registry.handlers.is_empty() {
            *guard = None;
            tracing::debug!("[broadcast] last subscriber left, registry torn down");
        }
        removed
    }

    /// Notify every subscriber. Returns how many handlers ran.
    ///
    /// Handlers run after the registry lock is released, so they may
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self) -> usize {
        let handlers: Vec<Handler> = match self.registry.lock().as_ref() {
            Some(registry) => registry.handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return 0,
        };
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .as_ref()
            .map_or(0, |registry| registry.handlers.len())
    }

    /// True while at least one subscriber keeps the registry alive.
    pub fn is_active(&self) -> bool {
        self.registry.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter(broadcast: &RecallBroadcast) -> (SubscriptionId, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let id = broadcast.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (id, count)
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let broadcast = RecallBroadcast::new();
        assert!(!broadcast.is_active());
        assert_eq!(broadcast.publish(), 0);
    }

    #[test]
    fn test_every_subscriber_sees_each_publish() {
        let broadcast = RecallBroadcast::new();
        let (_, a) = counter(&broadcast);
        let (_, b) = counter(&broadcast);

        assert_eq!(broadcast.publish(), 2);
        assert_eq!(broadcast.publish(), 2);
        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let broadcast = RecallBroadcast::new();
        let (id_a, a) = counter(&broadcast);
        let (_, b) = counter(&broadcast);

        assert!(broadcast.unsubscribe(id_a));
        assert!(!broadcast.unsubscribe(id_a));
        broadcast.publish();

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registry_torn_down_after_last_unsubscribe() {
        let broadcast = RecallBroadcast::new();
        let (id, _) = counter(&broadcast);
        assert!(broadcast.is_active());

        broadcast.unsubscribe(id);
        assert!(!broadcast.is_active());
        assert_eq!(broadcast.subscriber_count(), 0);

        // Re-initializes on next use
        let (_, count) = counter(&broadcast);
        broadcast.publish();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ids_survive_registry_teardown() {
        let broadcast = RecallBroadcast::new();
        let (stale, _) = counter(&broadcast);
        broadcast.unsubscribe(stale);
        assert!(!broadcast.is_active());

        let (fresh, count) = counter(&broadcast);
        assert_ne!(stale, fresh);

        // The old handle must not remove the new subscriber
        assert!(!broadcast.unsubscribe(stale));
        assert_eq!(broadcast.subscriber_count(), 1);
        assert_eq!(broadcast.publish(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let broadcast = RecallBroadcast::new();
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let inner = broadcast.clone();
        let own_id = Arc::clone(&slot);
        let id = broadcast.subscribe(move || {
            if let Some(id) = own_id.lock().take() {
                inner.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        assert_eq!(broadcast.publish(), 1);
        assert_eq!(broadcast.subscriber_count(), 0);
        assert_eq!(broadcast.publish(), 0);
    }

    #[test]
    fn test_clones_share_one_channel() {
        let broadcast = RecallBroadcast::new();
        let clone = broadcast.clone();
        let (_, count) = counter(&clone);
        broadcast.publish();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_is_a_single_instance() {
        let a = RecallBroadcast::global();
        let b = RecallBroadcast::global();
        assert!(Arc::ptr_eq(&a.registry, &b.registry));
    }
}
