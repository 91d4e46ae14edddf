//! Pointer Tracker
//!
//! The host window publishes raw pointer movement into a [`PointerHub`].
//! Views that need pointer samples hold a [`PointerSubscription`]; dropping
//! the subscription releases it, so a view torn down early (or unwinding)
//! never leaves a dangling listener behind.
//!
//! ```text
//! Host window events
//!   └─> PointerHub::publish
//!       └─> PointerSubscription (one channel per view)
//!           └─> PointerTracker::poll  (once per frame, keeps the latest)
//! ```

use std::sync::{Arc, Weak};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::geometry::Point;

/// One raw pointer position in viewport pixels
pub type PointerSample = Point;

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<PointerSample>)>,
}

/// Window-level source of pointer samples
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    inner: Arc<Mutex<HubInner>>,
}

impl PointerHub {
    /// Create a hub with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener; it stays registered until the guard is dropped
    pub fn subscribe(&self) -> PointerSubscription {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, sender));
        debug!("Pointer subscription {} acquired", id);

        PointerSubscription {
            id,
            hub: Arc::downgrade(&self.inner),
            receiver,
        }
    }

    /// Deliver a sample to every live subscription
    pub fn publish(&self, sample: PointerSample) {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|(_, sender)| sender.send(sample).is_ok());
        trace!(
            "Pointer sample ({:.1}, {:.1}) -> {} subscribers",
            sample.x,
            sample.y,
            inner.subscribers.len()
        );
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// Scoped registration with a [`PointerHub`]
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    hub: Weak<Mutex<HubInner>>,
    receiver: Receiver<PointerSample>,
}

impl PointerSubscription {
    /// Drain every pending sample, oldest first
    pub fn drain(&self) -> Vec<PointerSample> {
        let mut samples = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(sample) => samples.push(sample),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        samples
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock().subscribers.retain(|(id, _)| *id != self.id);
        }
        debug!("Pointer subscription {} released", self.id);
    }
}

/// Keeps the most recent pointer position for the enclosing view
#[derive(Debug)]
pub struct PointerTracker {
    subscription: PointerSubscription,
    latest: Option<PointerSample>,
    samples_seen: u64,
}

impl PointerTracker {
    /// Subscribe to `hub` for the lifetime of the tracker
    pub fn attach(hub: &PointerHub) -> Self {
        Self {
            subscription: hub.subscribe(),
            latest: None,
            samples_seen: 0,
        }
    }

    /// Consume pending samples and return the latest known position.
    ///
    /// Called once at the start of every frame so every later stage reads the
    /// same sample.
    pub fn poll(&mut self) -> Option<PointerSample> {
        let samples = self.subscription.drain();
        self.samples_seen += samples.len() as u64;
        if let Some(last) = samples.last() {
            self.latest = Some(*last);
        }
        self.latest
    }

    /// Latest position without draining
    pub fn latest(&self) -> Option<PointerSample> {
        self.latest
    }

    /// The pointer left the window; forget the last position
    pub fn reset(&mut self) {
        self.latest = None;
    }

    /// Total samples received since attaching
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_keeps_latest_sample() {
        let hub = PointerHub::new();
        let mut tracker = PointerTracker::attach(&hub);
        assert_eq!(tracker.poll(), None);

        hub.publish(Point::new(1.0, 2.0));
        hub.publish(Point::new(3.0, 4.0));
        assert_eq!(tracker.poll(), Some(Point::new(3.0, 4.0)));
        assert_eq!(tracker.samples_seen(), 2);

        // No new samples: the last one is still current
        assert_eq!(tracker.poll(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_drop_releases_subscription() {
        let hub = PointerHub::new();
        {
            let _a = PointerTracker::attach(&hub);
            let _b = hub.subscribe();
            assert_eq!(hub.subscriber_count(), 2);
        }
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_release_on_unwind() {
        let hub = PointerHub::new();
        let hub_clone = hub.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _tracker = PointerTracker::attach(&hub_clone);
            panic!("view failed during mount");
        }));
        assert!(result.is_err());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_hub() {
        let hub = PointerHub::new();
        let mut tracker = PointerTracker::attach(&hub);
        hub.publish(Point::new(5.0, 5.0));
        drop(hub);
        assert_eq!(tracker.poll(), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_reset_forgets_position() {
        let hub = PointerHub::new();
        let mut tracker = PointerTracker::attach(&hub);
        hub.publish(Point::new(5.0, 5.0));
        tracker.poll();
        tracker.reset();
        assert_eq!(tracker.poll(), None);
    }
}
