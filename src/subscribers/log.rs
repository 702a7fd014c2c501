//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [status] channel=primary-api status=connected
//! [failover] channel=backup-api status=connected
//! [failover] no channel available
//! [restored] channel=primary-api status=idle
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let status = e.status.map(|s| s.as_label()).unwrap_or("?");
        match e.kind {
            EventKind::StatusChange => {
                if let Some(channel) = &e.channel {
                    println!("[status] channel={channel} status={status}");
                }
            }
            EventKind::Failover => match &e.channel {
                Some(channel) => println!("[failover] channel={channel} status={status}"),
                None => println!("[failover] no channel available"),
            },
            EventKind::Restored => {
                if let Some(channel) = &e.channel {
                    println!("[restored] channel={channel} status={status}");
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
