//! In-process change notification for entity lists.
//!
//! # Responsibility
//! - Tell other views that an entity list changed, and how.
//! - Keep delivery synchronous and in publish order.
//!
//! # Invariants
//! - `revision` strictly increases across all published events.
//! - Subscribers are snapshotted before delivery, so callbacks may subscribe
//!   or unsubscribe without deadlocking.
//! - No deduplication: every publish reaches every matching subscriber.

use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Kind of mutation behind a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Empty storage was filled with the demo dataset.
    Seeded,
    /// Malformed stored data was discarded and reseeded.
    Regenerated,
    /// The cache was re-read from storage.
    Reloaded,
    Created,
    Updated,
    StatusChanged,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Regenerated => "regenerated",
            Self::Reloaded => "reloaded",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Deleted => "deleted",
        }
    }
}

/// One published change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Storage key of the entity list that changed.
    pub key: &'static str,
    pub kind: ChangeKind,
    /// Affected record, when the change targets exactly one.
    pub record_id: Option<String>,
    pub revision: u64,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Subscriber {
    key: Option<&'static str>,
    callback: Callback,
}

/// Publish/subscribe hub shared by every repository of one portal.
#[derive(Default)]
pub struct ChangeBus {
    next_subscription: AtomicU64,
    revision: AtomicU64,
    subscribers: Mutex<BTreeMap<SubscriptionId, Subscriber>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for changes to one storage key.
    pub fn subscribe(
        &self,
        key: &'static str,
        callback: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.insert(Some(key), Arc::new(callback))
    }

    /// Registers `callback` for changes to every key.
    pub fn subscribe_all(
        &self,
        callback: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.insert(None, Arc::new(callback))
    }

    /// Returns `false` when the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Latest published revision, `0` before the first publish.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Publishes one change and delivers it to matching subscribers.
    pub fn publish(
        &self,
        key: &'static str,
        kind: ChangeKind,
        record_id: Option<&str>,
    ) -> ChangeEvent {
        let event = ChangeEvent {
            key,
            kind,
            record_id: record_id.map(str::to_string),
            revision: self.revision.fetch_add(1, Ordering::SeqCst) + 1,
        };

        let targets: Vec<Callback> = self
            .lock()
            .values()
            .filter(|subscriber| subscriber.key.map_or(true, |k| k == key))
            .map(|subscriber| Arc::clone(&subscriber.callback))
            .collect();

        debug!(
            "event=change_publish module=sync status=ok key={} kind={} revision={} subscribers={}",
            key,
            kind.as_str(),
            event.revision,
            targets.len()
        );

        for callback in targets {
            callback(&event);
        }
        event
    }

    fn insert(&self, key: Option<&'static str>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.lock().insert(id, Subscriber { key, callback });
        id
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeBus, ChangeEvent, ChangeKind};
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<ChangeEvent>>>, impl Fn(&ChangeEvent) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |event: &ChangeEvent| {
            sink.lock().unwrap().push(event.clone())
        })
    }

    #[test]
    fn keyed_subscribers_only_see_their_key() {
        let bus = ChangeBus::new();
        let (events, on_event) = recorder();
        let (all, on_any) = recorder();
        bus.subscribe("campus.events", on_event);
        bus.subscribe_all(on_any);

        bus.publish("campus.events", ChangeKind::Created, Some("EVT-011"));
        bus.publish("campus.courses", ChangeKind::Deleted, Some("CRS-001"));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record_id.as_deref(), Some("EVT-011"));
        assert_eq!(all.lock().unwrap().len(), 2);
    }

    #[test]
    fn revisions_increase_in_publish_order() {
        let bus = ChangeBus::new();
        let (seen, on_any) = recorder();
        bus.subscribe_all(on_any);

        for _ in 0..3 {
            bus.publish("campus.tasks", ChangeKind::Updated, None);
        }

        let revisions: Vec<u64> = seen.lock().unwrap().iter().map(|e| e.revision).collect();
        assert_eq!(revisions, vec![1, 2, 3]);
        assert_eq!(bus.revision(), 3);
    }

    #[test]
    fn unsubscribed_callbacks_are_not_called() {
        let bus = ChangeBus::new();
        let (seen, on_any) = recorder();
        let id = bus.subscribe_all(on_any);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish("campus.tasks", ChangeKind::Deleted, Some("TSK-001"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn callbacks_may_unsubscribe_themselves() {
        let bus = Arc::new(ChangeBus::new());
        let slot = Arc::new(Mutex::new(None));
        let (bus_ref, slot_ref) = (Arc::clone(&bus), Arc::clone(&slot));
        let id = bus.subscribe_all(move |_| {
            if let Some(id) = slot_ref.lock().unwrap().take() {
                bus_ref.unsubscribe(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        bus.publish("campus.events", ChangeKind::Updated, None);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn callbacks_may_subscribe_during_delivery() {
        let bus = Arc::new(ChangeBus::new());
        let (late, on_late) = recorder();
        let pending = Mutex::new(Some(on_late));
        let bus_ref = Arc::clone(&bus);
        bus.subscribe_all(move |_| {
            if let Some(callback) = pending.lock().unwrap().take() {
                bus_ref.subscribe_all(callback);
            }
        });

        bus.publish("campus.events", ChangeKind::Created, Some("EVT-011"));
        assert_eq!(bus.subscriber_count(), 2);
        assert!(late.lock().unwrap().is_empty());

        bus.publish("campus.events", ChangeKind::Deleted, Some("EVT-011"));
        let late = late.lock().unwrap();
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].revision, 2);
    }
}
