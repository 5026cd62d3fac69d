//! # Per-source exception hook.
//!
//! An [`Exception`] hook receives every failed invocation of its source:
//! the record that was being delivered (when one exists) and the error.
//! The runtime observes no return value — the hook is a pure side-effecting
//! extension point for alerting, counting, or escalating (e.g. removing the
//! source through a captured manager handle).
//!
//! Hooks are invoked from whichever worker owns the source at the time, so
//! they must be safe under concurrent invocation when shared across sources.
//! Any `Fn(Option<&T>, &IngestError)` closure is a hook.

use std::sync::Arc;

use crate::error::IngestError;

/// Callback invoked once per failed invocation of a source.
///
/// `record` is `Some` when a record was produced but could not be delivered
/// or committed, `None` when the pull itself failed. Cooperative
/// cancellation never reaches the hook.
pub trait Exception<T>: Send + Sync + 'static {
    /// Reports one failed invocation.
    fn on_exception(&self, record: Option<&T>, error: &IngestError);
}

impl<T, F> Exception<T> for F
where
    F: Fn(Option<&T>, &IngestError) + Send + Sync + 'static,
{
    fn on_exception(&self, record: Option<&T>, error: &IngestError) {
        self(record, error)
    }
}

/// Shared handle to an exception hook.
pub type ExceptionRef<T> = Arc<dyn Exception<T>>;
