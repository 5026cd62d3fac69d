//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [added] source=meter
//! [starting] source=meter
//! [pull-failed] source=meter tick=3 err="connection refused"
//! [timeout] source=meter tick=4 timeout_ms=5000
//! [commit] source=meter tick=5 ops=1
//! [stopped] source=meter
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```
//!
//! Not intended for production use — implement a custom
//! [`Subscriber`](crate::Subscriber) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::subscriber::Subscriber;

/// Simple stdout logging subscriber.
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.kind {
            EventKind::SourceAdded => {
                println!("[added] source={:?}", e.source);
            }
            EventKind::SourceRemoved => {
                println!("[removed] source={:?}", e.source);
            }
            EventKind::SourceStarting => {
                println!("[starting] source={:?}", e.source);
            }
            EventKind::PullFailed => {
                println!(
                    "[pull-failed] source={:?} tick={:?} err={:?}",
                    e.source, e.tick, e.reason
                );
            }
            EventKind::TimeoutHit => {
                println!(
                    "[timeout] source={:?} tick={:?} timeout_ms={:?}",
                    e.source, e.tick, e.timeout_ms
                );
            }
            EventKind::DeliverFailed => {
                println!(
                    "[deliver-failed] source={:?} tick={:?} err={:?}",
                    e.source, e.tick, e.reason
                );
            }
            EventKind::CommitApplied => {
                println!(
                    "[commit] source={:?} tick={:?} ops={:?}",
                    e.source, e.tick, e.ops
                );
            }
            EventKind::CommitFailed => {
                println!(
                    "[commit-failed] source={:?} tick={:?} err={:?}",
                    e.source, e.tick, e.reason
                );
            }
            EventKind::SourceStopped => {
                println!("[stopped] source={:?}", e.source);
            }
            EventKind::SourceFaulted => {
                println!("[faulted] source={:?} err={:?}", e.source, e.reason);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] stuck={:?}", e.reason);
            }
        }
    }
}
