//! Registry of currently connected map viewers.
//!
//! The one piece of genuinely shared mutable state in the system. Connect
//! adds a subscriber, disconnect removes it, and publish iterates the set
//! without pausing in-flight fan-outs. A subscriber added microseconds after
//! a publish simply misses that event (best-effort, at-most-once); it never
//! observes a partially constructed one, because events are built before the
//! lock is taken and shared as immutable values.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::LocationChanged;
use crate::domain::ports::UpdatePublisher;

/// Handle identifying one connected viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

/// Per-subscriber stream of location changes.
///
/// Each subscriber owns an unbounded FIFO channel, so events for the same
/// listing arrive in publish order. No ordering is promised across
/// subscribers or across listings.
pub type UpdateStream = mpsc::UnboundedReceiver<Arc<LocationChanged>>;

type SubscriberMap = HashMap<SubscriberId, mpsc::UnboundedSender<Arc<LocationChanged>>>;

/// Fan-out channel for [`LocationChanged`] events.
///
/// Constructed once and passed explicitly to the broadcaster and the
/// WebSocket adapter; never ambient global state.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<SubscriberMap>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a viewer and return its event stream.
    pub fn subscribe(&self) -> (SubscriberId, UpdateStream) {
        let id = SubscriberId(Uuid::new_v4());
        let (sender, receiver) = mpsc::unbounded_channel();
        self.write_lock().insert(id, sender);
        debug!(subscriber = %id.0, "viewer subscribed");
        (id, receiver)
    }

    /// Remove a viewer on disconnect. Removing twice is harmless.
    pub fn unsubscribe(&self, id: SubscriberId) {
        if self.write_lock().remove(&id).is_some() {
            debug!(subscriber = %id.0, "viewer unsubscribed");
        }
    }

    /// Number of currently connected viewers.
    pub fn subscriber_count(&self) -> usize {
        self.read_lock().len()
    }

    /// Deliver one event to every live subscriber.
    ///
    /// Dead subscribers (receiver dropped without an unsubscribe) are
    /// skipped and pruned; their failures are swallowed so partial delivery
    /// never aborts the fan-out.
    pub fn publish(&self, event: LocationChanged) {
        let event = Arc::new(event);
        let mut dead: Vec<SubscriberId> = Vec::new();
        let mut delivered = 0usize;

        {
            let subscribers = self.read_lock();
            for (id, sender) in subscribers.iter() {
                if sender.send(Arc::clone(&event)).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.write_lock();
            for id in &dead {
                subscribers.remove(id);
            }
        }

        debug!(
            listing_id = %event.listing_id,
            delivered,
            pruned = dead.len(),
            "location change published"
        );
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, SubscriberMap> {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, SubscriberMap> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl UpdatePublisher for SubscriberRegistry {
    fn publish(&self, event: LocationChanged) {
        Self::publish(self, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, Geometry, Listing};

    fn event_for(title: &str, longitude: f64) -> LocationChanged {
        let coordinate = Coordinate::new(longitude, 45.0).expect("valid coordinate");
        let listing = Listing::new(
            title.into(),
            "somewhere".into(),
            Geometry::Point(coordinate),
        );
        LocationChanged::for_listing(&listing, coordinate)
    }

    #[test]
    fn publish_reaches_every_live_subscriber() {
        let registry = SubscriberRegistry::new();
        let (_id_a, mut a) = registry.subscribe();
        let (_id_b, mut b) = registry.subscribe();

        registry.publish(event_for("Canal flat", 2.35));

        assert_eq!(a.try_recv().expect("a receives").title, "Canal flat");
        assert_eq!(b.try_recv().expect("b receives").title, "Canal flat");
    }

    #[test]
    fn dead_subscriber_is_skipped_and_pruned() {
        let registry = SubscriberRegistry::new();
        let (_a, mut live_a) = registry.subscribe();
        let (_b, mut live_b) = registry.subscribe();
        let (_c, mut live_c) = registry.subscribe();
        let (_dead, receiver) = registry.subscribe();
        drop(receiver);

        registry.publish(event_for("Canal flat", 2.35));

        for receiver in [&mut live_a, &mut live_b, &mut live_c] {
            assert!(receiver.try_recv().is_ok(), "live subscriber must receive");
        }
        assert_eq!(registry.subscriber_count(), 3, "dead channel pruned");
    }

    #[test]
    fn same_listing_events_arrive_in_publish_order() {
        let registry = SubscriberRegistry::new();
        let (_id, mut stream) = registry.subscribe();

        registry.publish(event_for("Canal flat", 2.35));
        registry.publish(event_for("Canal flat", 2.40));

        let first = stream.try_recv().expect("first event");
        let second = stream.try_recv().expect("second event");
        assert_eq!(first.coordinates.longitude, 2.35);
        assert_eq!(second.coordinates.longitude, 2.40);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let registry = SubscriberRegistry::new();
        let (id, mut stream) = registry.subscribe();
        registry.unsubscribe(id);

        registry.publish(event_for("Canal flat", 2.35));

        assert!(stream.try_recv().is_err());
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let registry = SubscriberRegistry::new();
        registry.publish(event_for("Canal flat", 2.35));

        let (_id, mut stream) = registry.subscribe();
        assert!(stream.try_recv().is_err(), "no replay for late subscribers");
    }
}
