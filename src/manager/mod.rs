//! Failover manager: the runtime core.
//!
//! Internal modules:
//! - [`builder`]: explicit construction with dependency injection;
//! - [`state`]: lock-guarded mutable state (registry, active pointer,
//!   poll-loop handle, activation generation);
//! - [`failover`]: activation/failover transitions and the public API;
//! - [`loops`]: the periodic loops (health check, active poll, failure
//!   injection) and the stream failure path.

mod builder;
mod failover;
mod loops;
mod state;

pub use builder::ManagerBuilder;
pub use failover::FailoverManager;
