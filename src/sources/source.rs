//! # Source trait: a named, cancelable record producer.
//!
//! A [`Source`] has a stable [`name`](Source::name) and an async
//! [`pull`](Source::pull) method that yields one record per invocation. The
//! common handle type is [`SourceRef`], an `Arc<dyn Source<T>>` suitable for
//! sharing across the runtime.
//!
//! Pulls receive a [`CancellationToken`] and should check it during longer
//! work to exit promptly on shutdown; a pull that never returns stalls only
//! its own worker, but `stop` will then name this source as stuck.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::IngestError;

/// # Asynchronous, cancelable record producer.
///
/// `name` is used in diagnostics whenever the source misbehaves; keep it
/// stable for the source's lifetime. `pull` must have bounded latency under
/// every schedule except [`Schedule::Continuous`](crate::Schedule) — the
/// runtime never interrupts a pull mid-flight, it only cancels between
/// invocations.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use inflow::{IngestError, Source};
///
/// struct Sequence;
///
/// #[async_trait]
/// impl Source<u64> for Sequence {
///     fn name(&self) -> &str {
///         "sequence"
///     }
///
///     async fn pull(&self, ctx: CancellationToken) -> Result<u64, IngestError> {
///         if ctx.is_cancelled() {
///             return Err(IngestError::Canceled);
///         }
///         Ok(7)
///     }
/// }
/// ```
#[async_trait]
pub trait Source<T>: Send + Sync + 'static {
    /// Returns a stable, human-readable source name.
    fn name(&self) -> &str;

    /// Produces one record.
    ///
    /// Returning [`IngestError::Canceled`] marks a cooperative exit; any
    /// other error counts as a failed invocation and is routed to the
    /// exception hook.
    async fn pull(&self, ctx: CancellationToken) -> Result<T, IngestError>;
}

/// Shared handle to a source.
pub type SourceRef<T> = Arc<dyn Source<T>>;
