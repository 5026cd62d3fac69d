//! # Sink trait: the output boundary.
//!
//! A [`Sink`] accepts one produced record per call. The runtime consumes
//! nothing from it beyond success/failure: a rejected record is routed to
//! the owning source's exception hook, never retried by the framework.
//!
//! Sinks are invoked from whichever worker owns the producing source at the
//! time, so implementations shared across sources must be safe under
//! concurrent invocation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::IngestError;

/// External consumer of produced records.
#[async_trait]
pub trait Sink<T>: Send + Sync + 'static {
    /// Accepts one record.
    async fn put(&self, record: T) -> Result<(), IngestError>;
}

/// Shared handle to a sink.
pub type SinkRef<T> = Arc<dyn Sink<T>>;
