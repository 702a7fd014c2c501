//! # Event subscribers.
//!
//! Anything implementing [`Subscribe`] can be attached to the manager and
//! receives every subsequent lifecycle event.
//!
//! ```text
//! Event flow:
//!   manager loops ── publish(Event) ──► Bus ──► subscriber listener
//!                                                   │
//!                                                   ▼
//!                                             SubscriberSet
//!                                        ┌─────────┼─────────┐
//!                                        ▼         ▼         ▼
//!                                    LogWriter  metrics   custom ...
//! ```
//!
//! Each subscriber gets a dedicated bounded queue and worker task, so a slow
//! or panicking subscriber never affects the manager or its peers.
//! Subscriptions are handle-based: [`SubscriberSet::add`] returns a
//! [`SubscriptionId`] that detaches the subscriber when passed to
//! [`SubscriberSet::remove`].

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::{SubscriberSet, SubscriptionId};
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
