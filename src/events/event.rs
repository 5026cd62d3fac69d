//! # Runtime events emitted by the manager and source workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registration events**: sources entering and leaving the registry
//! - **Invocation events**: pull/deliver/commit outcomes per tick
//! - **Terminal events**: a worker's final state (stopped, faulted)
//! - **Shutdown events**: the manager's graceful-shutdown milestones
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! source name, failure reasons, and tick numbers.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration events ===
    /// A source was inserted into the registry.
    ///
    /// Sets: `source`, `at`, `seq`.
    SourceAdded,

    /// A source was removed from the registry (after its worker joined).
    ///
    /// Sets: `source`, `at`, `seq`.
    SourceRemoved,

    // === Invocation events ===
    /// A worker began scheduling its source.
    ///
    /// Sets: `source`, `at`, `seq`.
    SourceStarting,

    /// A pull invocation failed (error or panic).
    ///
    /// Sets: `source`, `tick`, `reason`, `at`, `seq`.
    PullFailed,

    /// A pull invocation exceeded its configured timeout.
    ///
    /// Sets: `source`, `tick`, `timeout_ms`, `at`, `seq`.
    TimeoutHit,

    /// The sink rejected a produced record.
    ///
    /// Sets: `source`, `tick`, `reason`, `at`, `seq`.
    DeliverFailed,

    /// A transaction batch was committed for this tick.
    ///
    /// Sets: `source`, `tick`, `ops`, `at`, `seq`.
    CommitApplied,

    /// A transaction batch aborted for this tick.
    ///
    /// Sets: `source`, `tick`, `reason`, `at`, `seq`.
    CommitFailed,

    // === Worker terminal states ===
    /// A worker exited cleanly (one-shot completion or cooperative stop).
    ///
    /// Sets: `source`, `at`, `seq`.
    SourceStopped,

    /// A worker exited because its one-shot invocation failed.
    ///
    /// Sets: `source`, `reason`, `at`, `seq`.
    SourceFaulted,

    // === Shutdown events ===
    /// Graceful shutdown was requested.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All sources stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some sources did not stop in time.
    ///
    /// Sets: `reason` (stuck source names), `at`, `seq`.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the source, if applicable.
    pub source: Option<Arc<str>>,
    /// Human-readable reason (errors, stuck lists, etc.).
    pub reason: Option<Arc<str>>,
    /// Invocation counter within one worker (starting from 1).
    pub tick: Option<u64>,
    /// Pull timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Number of save operations in a committed batch.
    pub ops: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            reason: None,
            tick: None,
            timeout_ms: None,
            ops: None,
        }
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an invocation tick number.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a batch size.
    #[inline]
    pub fn with_ops(mut self, ops: u32) -> Self {
        self.ops = Some(ops);
        self
    }
}
