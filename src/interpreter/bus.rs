//! Subscriber registry and notification rounds.

use crate::interpreter::snapshot::Snapshot;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

pub(crate) type Callback = Arc<dyn Fn(&Arc<Snapshot>) + Send + Sync>;

/// Subscribers keyed by a never-reused id.
///
/// Ids only grow, so iterating the map visits subscribers in the order they
/// subscribed, and an id handed to a [`Subscription`] can never name a
/// later subscriber.
#[derive(Default)]
pub(crate) struct SubscriptionBus {
    inner: Mutex<Slots>,
}

#[derive(Default)]
struct Slots {
    next: u64,
    callbacks: BTreeMap<u64, Callback>,
}

impl SubscriptionBus {
    pub(crate) fn add(&self, callback: Callback) -> u64 {
        let mut inner = self.inner.lock();
        let slot = inner.next;
        inner.next += 1;
        inner.callbacks.insert(slot, callback);
        slot
    }

    pub(crate) fn remove(&self, slot: u64) -> bool {
        self.inner.lock().callbacks.remove(&slot).is_some()
    }

    fn is_live(&self, slot: u64) -> bool {
        self.inner.lock().callbacks.contains_key(&slot)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    /// Run one notification round.
    ///
    /// The round works on a copy of the subscribers taken before the first
    /// callback runs. Callbacks may subscribe, unsubscribe or send without
    /// affecting the round in progress.
    pub(crate) fn notify(&self, snapshot: &Arc<Snapshot>) {
        let round: Vec<Callback> = self.inner.lock().callbacks.values().cloned().collect();
        for callback in round {
            callback(snapshot);
        }
    }
}

impl fmt::Debug for SubscriptionBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle returned by [`Interpreter::subscribe`](crate::interpreter::Interpreter::subscribe).
///
/// Dropping the handle does not unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    slot: u64,
    bus: Weak<SubscriptionBus>,
}

impl Subscription {
    pub(crate) fn new(slot: u64, bus: &Arc<SubscriptionBus>) -> Self {
        Self {
            slot,
            bus: Arc::downgrade(bus),
        }
    }

    /// Stop receiving snapshots. Idempotent.
    pub fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove(self.slot) {
                tracing::trace!(slot = self.slot, "subscriber removed");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|bus| bus.is_live(self.slot))
    }
}
