//! # Manager configuration.
//!
//! [`ManagerConfig`] centralizes the timing and policy knobs of the
//! [`FailoverManager`](crate::FailoverManager).
//!
//! ## Field semantics
//! - `health_check_interval`: period between probes of `Unavailable` HTTP channels
//! - `poll_interval`: period of the active HTTP channel's payload poll
//! - `failure_injection`: `None` = disabled; `Some(d)` = forcibly fail the
//!   active channel every `d` (test/demo harness)
//! - `allow_priority_restore`: whether a restored channel may preempt the
//!   active one (or fill an empty active slot)
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus)

use std::time::Duration;

/// Configuration for the failover manager runtime.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Period between health-check probes of `Unavailable` HTTP channels.
    pub health_check_interval: Duration,

    /// Period of the active-channel polling loop (HTTP channels only).
    ///
    /// Should be shorter than `health_check_interval`: payload delivery is
    /// latency-sensitive, recovery probing is not.
    pub poll_interval: Duration,

    /// Optional failure-injection period.
    ///
    /// When set, the manager forcibly marks the active channel `Unavailable`
    /// on this period and runs failover, exercising the failover path
    /// deterministically without real network failures. Disabled by default.
    pub failure_injection: Option<Duration>,

    /// Whether a restored channel preempts the current active channel when
    /// its priority is strictly better, or fills the active slot when there
    /// is no active channel at all.
    pub allow_priority_restore: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// skip older items. Minimum value is 1 (enforced by the Bus).
    pub bus_capacity: usize,
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `health_check_interval = 5s`
    /// - `poll_interval = 3s`
    /// - `failure_injection = None` (disabled)
    /// - `allow_priority_restore = false`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(5),
            poll_interval: Duration::from_secs(3),
            failure_injection: None,
            allow_priority_restore: false,
            bus_capacity: 1024,
        }
    }
}
