//! # Event subscriber trait.
//!
//! [`Subscriber`] is the extension point for plugging custom event handlers
//! into the runtime. The manager runs one listener task that receives every
//! bus event and hands it to each subscriber in registration order.
//!
//! ## Rules
//! - Handlers run on the shared listener task: a slow handler delays the
//!   delivery of later events to all subscribers, never the workers.
//! - The bus is lossy; a lagging listener skips the oldest events.
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use inflow::{Event, EventKind, Subscriber};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscriber for FailureCounter {
//!     async fn handle(&self, event: &Event) {
//!         if event.kind == EventKind::PullFailed {
//!             // increment a counter
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of runtime events.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Processes one event.
    async fn handle(&self, event: &Event);
}
