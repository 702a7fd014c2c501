//! # Non-blocking event fan-out with handle-based unsubscription.
//!
//! [`SubscriberSet`] distributes each [`Event`] to the attached subscribers
//! without awaiting their processing.
//!
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## Rules
//! - `emit(&Event)` returns immediately (uses `try_send`).
//! - Per-subscriber FIFO; no ordering across different subscribers.
//! - Queue overflow drops the event **for that subscriber only**.
//! - Panics inside a subscriber are caught and logged (isolation).
//! - Removing a subscription closes its queue; the worker drains what it
//!   already accepted and exits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::events::Event;

use super::Subscribe;

/// Opaque handle identifying one attached subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    id: SubscriptionId,
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out over multiple subscribers, each with a bounded queue and a
/// dedicated worker task.
#[derive(Default)]
pub struct SubscriberSet {
    channels: Mutex<Vec<SubscriberChannel>>,
    next_id: AtomicU64,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a subscriber and spawns its worker. Returns the handle that
    /// detaches it again.
    ///
    /// Must be called from within a tokio runtime.
    pub fn add(&self, sub: Arc<dyn Subscribe>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cap = sub.queue_capacity().max(1);
        let name = sub.name();
        let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);

        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let fut = sub.on_event(ev.as_ref());
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    eprintln!(
                        "[chanvisor] subscriber '{}' panicked: {:?}",
                        sub.name(),
                        panic_err
                    );
                }
            }
        });

        self.channels
            .lock()
            .expect("subscriber set lock poisoned")
            .push(SubscriberChannel {
                id,
                name,
                sender: tx,
            });
        id
    }

    /// Detaches a subscriber. Returns `false` if the handle is unknown
    /// (already removed).
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut channels = self.channels.lock().expect("subscriber set lock poisoned");
        let before = channels.len();
        channels.retain(|c| c.id != id);
        channels.len() != before
    }

    /// Fans one event out to all attached subscribers (non-blocking).
    ///
    /// If a subscriber's queue is full or closed, the event is dropped for
    /// it and a warning is logged with the subscriber's name.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        let channels = self.channels.lock().expect("subscriber set lock poisoned");
        for channel in channels.iter() {
            if let Err(err) = channel.sender.try_send(Arc::clone(&ev)) {
                let reason = match err {
                    mpsc::error::TrySendError::Full(_) => "full",
                    mpsc::error::TrySendError::Closed(_) => "closed",
                };
                eprintln!(
                    "[chanvisor] dropping event for subscriber '{}': queue {}",
                    channel.name, reason
                );
            }
        }
    }

    /// Number of attached subscribers.
    pub fn len(&self) -> usize {
        self.channels
            .lock()
            .expect("subscriber set lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
