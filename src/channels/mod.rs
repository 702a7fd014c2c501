//! Channel descriptors and the priority-ordered registry.
//!
//! - [`spec`]: channel identity, transport kind, status, snapshots;
//! - [`registry`]: the fixed-membership set sorted by priority, mutated
//!   exclusively by the [`FailoverManager`](crate::FailoverManager).

mod registry;
mod spec;

pub(crate) use registry::Registry;
pub use spec::{ChannelSnapshot, ChannelSpec, ChannelStatus, TransportKind};
