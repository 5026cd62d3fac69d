//! Error types used by the inflow runtime, sources, and transactions.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself
//!   (registration, shutdown).
//! - [`IngestError`] — errors raised by individual source invocations and
//!   record delivery.
//! - [`CommitError`] — errors raised when a transaction batch aborts.
//!
//! All types provide `as_label` helpers returning short stable snake_case
//! labels for logs and event reasons.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the inflow runtime.
///
/// These represent failures in the orchestration system itself: invalid
/// registrations, lifecycle misuse, or a shutdown sequence exceeding its
/// grace period.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some sources ignored cancellation.
    #[error("shutdown grace {grace:?} exceeded; stuck sources: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of sources that did not stop in time.
        stuck: Vec<String>,
    },

    /// A periodic schedule was registered with a zero interval.
    #[error("source {source_name:?} uses a periodic schedule with a zero interval")]
    InvalidInterval {
        /// Name of the rejected source.
        source_name: String,
    },

    /// The manager has already been shut down; no further registrations or runs.
    #[error("manager already shut down")]
    Terminated,

    /// `run` was invoked while another run loop is still active.
    #[error("manager run loop is already active")]
    AlreadyRunning,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs and events.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::InvalidInterval { .. } => "runtime_invalid_interval",
            RuntimeError::Terminated => "runtime_terminated",
            RuntimeError::AlreadyRunning => "runtime_already_running",
        }
    }
}

/// # Errors produced while pulling or delivering a single record.
///
/// Every invocation of a source is isolated: whatever it raises — an error,
/// a panic, a timeout — becomes an `IngestError` at the scheduling boundary
/// and is routed to the registered exception hook. `Canceled` is the one
/// exception: it marks a cooperative exit during shutdown and is never
/// reported as a failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum IngestError {
    /// The source reported a failure for this invocation.
    #[error("pull failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The sink rejected the produced record.
    #[error("sink rejected record: {error}")]
    Deliver {
        /// The underlying error message.
        error: String,
    },

    /// The source panicked; caught at the scheduling boundary.
    #[error("pull panicked: {message}")]
    Panic {
        /// The captured panic payload, if printable.
        message: String,
    },

    /// The invocation exceeded its configured timeout.
    #[error("pull timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The invocation was cancelled by runtime shutdown or removal.
    #[error("cancelled")]
    Canceled,
}

impl IngestError {
    /// Shorthand for [`IngestError::Fail`] from any displayable error.
    pub fn fail(error: impl Into<String>) -> Self {
        IngestError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`IngestError::Deliver`] from any displayable error.
    pub fn deliver(error: impl Into<String>) -> Self {
        IngestError::Deliver {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs and events.
    pub fn as_label(&self) -> &'static str {
        match self {
            IngestError::Fail { .. } => "pull_failed",
            IngestError::Deliver { .. } => "deliver_failed",
            IngestError::Panic { .. } => "pull_panicked",
            IngestError::Timeout { .. } => "pull_timeout",
            IngestError::Canceled => "pull_canceled",
        }
    }

    /// True for [`IngestError::Canceled`] — a cooperative exit, not a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, IngestError::Canceled)
    }
}

/// # Errors produced when a transaction batch aborts.
///
/// A batch executes its save operations in order and stops at the first
/// failure; operations after the failing one are never invoked.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommitError {
    /// The batch aborted at the given operation.
    #[error("batch aborted at op {index} ({op}): {source}")]
    Aborted {
        /// Zero-based position of the failing operation.
        index: usize,
        /// The failing operation's own description.
        op: String,
        /// The underlying failure.
        #[source]
        source: IngestError,
    },
}

impl CommitError {
    /// Returns a short stable label (snake_case) for use in logs and events.
    pub fn as_label(&self) -> &'static str {
        match self {
            CommitError::Aborted { .. } => "commit_aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_labels_are_stable() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(5),
            stuck: vec!["feed".into()],
        };
        assert_eq!(err.as_label(), "runtime_grace_exceeded");
        assert_eq!(RuntimeError::Terminated.as_label(), "runtime_terminated");
    }

    #[test]
    fn cancellation_is_not_a_failure() {
        assert!(IngestError::Canceled.is_cancellation());
        assert!(!IngestError::fail("boom").is_cancellation());
        assert!(!IngestError::Timeout {
            timeout: Duration::from_secs(1)
        }
        .is_cancellation());
    }

    #[test]
    fn commit_error_names_the_op() {
        let err = CommitError::Aborted {
            index: 2,
            op: "record".into(),
            source: IngestError::deliver("disk full"),
        };
        let msg = err.to_string();
        assert!(msg.contains("op 2"), "unexpected message: {msg}");
        assert!(msg.contains("disk full"), "unexpected message: {msg}");
    }
}
