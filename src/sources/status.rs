//! # Source lifecycle state machine.
//!
//! Every registry entry carries a [`SourceStatus`] that moves strictly
//! forward through the lifecycle:
//!
//! ```text
//! Normal ──► WaitingToRun ──► Running ──► Stopping ──► Stopped
//!                                │
//!                                └──────► ExceptionExit
//! ```
//!
//! `Stopped` and `ExceptionExit` are terminal: no transition leaves them.
//! `ExceptionExit` is reachable only from `Running` — a failure observed
//! while shutdown is already in progress resolves as `Stopped` instead.
//!
//! [`StatusCell`] guards the transitions: `advance` refuses any move that
//! goes backwards, leaves a terminal state, or enters `ExceptionExit` from
//! anywhere but `Running`.

use std::sync::{Mutex, PoisonError};

/// Lifecycle status of a registered source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceStatus {
    /// Just registered, not yet scheduled.
    Normal,
    /// Scheduled, worker spawned, not yet executing.
    WaitingToRun,
    /// Executing, or between periodic ticks.
    Running,
    /// Graceful stop requested.
    Stopping,
    /// Terminal: exited cleanly.
    Stopped,
    /// Terminal: exited after a failed one-shot invocation.
    ExceptionExit,
}

impl SourceStatus {
    /// True for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceStatus::Stopped | SourceStatus::ExceptionExit)
    }

    /// Returns a short stable label (snake_case) for use in logs and events.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceStatus::Normal => "normal",
            SourceStatus::WaitingToRun => "waiting_to_run",
            SourceStatus::Running => "running",
            SourceStatus::Stopping => "stopping",
            SourceStatus::Stopped => "stopped",
            SourceStatus::ExceptionExit => "exception_exit",
        }
    }
}

/// Shared, transition-guarded status holder.
///
/// One cell per registry entry; the worker and the manager both advance it.
/// Critical sections are a single load/store, so a sync mutex is enough.
#[derive(Debug)]
pub(crate) struct StatusCell(Mutex<SourceStatus>);

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self(Mutex::new(SourceStatus::Normal))
    }

    /// Returns the current status.
    pub(crate) fn get(&self) -> SourceStatus {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attempts to advance to `next`; returns whether the move was applied.
    ///
    /// Rules:
    /// - terminal states are sticky;
    /// - moves must go strictly forward in lifecycle order;
    /// - `ExceptionExit` is only reachable from `Running`.
    pub(crate) fn advance(&self, next: SourceStatus) -> bool {
        let mut cur = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let allowed = match (*cur, next) {
            (cur, _) if cur.is_terminal() => false,
            (SourceStatus::Running, SourceStatus::ExceptionExit) => true,
            (_, SourceStatus::ExceptionExit) => false,
            (cur, next) => next > cur,
        };
        if allowed {
            *cur = next;
        }
        allowed
    }
}
