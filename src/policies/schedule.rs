//! # Schedules: when and how often a source runs.
//!
//! [`Schedule`] determines how the manager drives a registered source.
//!
//! - [`Schedule::Once`] — single invocation, fire-and-forget.
//! - [`Schedule::Periodic`] — re-invoked every fixed interval until stopped.
//! - [`Schedule::Continuous`] — invoked back-to-back with no delay on its
//!   own worker task until stopped.
//! - [`Schedule::Transactional`] — single invocation whose result is
//!   committed as one atomic batch.
//! - [`Schedule::PeriodicTransactional`] — periodic invocation, each tick
//!   committed as its own batch.
//!
//! ## Choosing the right schedule
//!
//! **One-shot ingestion** (run once, exit):
//! ```text
//! Schedule::Once                  → pull once, deliver, exit permanently
//! Schedule::Transactional         → pull once, commit atomically, exit
//! ```
//!
//! **Polling ingestion** (pull, wait, repeat):
//! ```text
//! Schedule::Periodic { every }              → pull, deliver, sleep, repeat
//! Schedule::PeriodicTransactional { every } → pull, commit, sleep, repeat
//! ```
//!
//! **Streaming ingestion** (no natural pause between pulls):
//! ```text
//! Schedule::Continuous            → pull back-to-back, poll cancellation
//!                                   between iterations
//! ```
//!
//! ## Failure semantics
//! One-shot schedules (`Once`, `Transactional`) are terminal after the first
//! failure. Repeating schedules (`Periodic`, `Continuous`,
//! `PeriodicTransactional`) report the failure through the exception hook
//! and keep their cadence; escalation — including removing the source — is
//! the hook's decision, never the runtime's.

use std::time::Duration;

/// Policy controlling when and how often a source is invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Invoke once; the worker exits after the first invocation.
    Once,
    /// Invoke every `every` until stopped. Requires a non-zero interval.
    Periodic {
        /// Delay between the start of consecutive invocations.
        every: Duration,
    },
    /// Invoke back-to-back with no enforced delay until stopped.
    Continuous,
    /// Invoke once; the produced record is committed as one atomic batch.
    Transactional,
    /// Invoke every `every`; each tick commits its own atomic batch, in
    /// tick order. Requires a non-zero interval.
    PeriodicTransactional {
        /// Delay between the start of consecutive invocations.
        every: Duration,
    },
}

impl Schedule {
    /// Returns the repeat interval for the periodic variants.
    pub fn every(&self) -> Option<Duration> {
        match self {
            Schedule::Periodic { every } | Schedule::PeriodicTransactional { every } => {
                Some(*every)
            }
            _ => None,
        }
    }

    /// True for the variants that commit through a transaction.
    pub fn is_transactional(&self) -> bool {
        matches!(
            self,
            Schedule::Transactional | Schedule::PeriodicTransactional { .. }
        )
    }

    /// True for the variants that invoke more than once.
    pub fn is_repeating(&self) -> bool {
        matches!(
            self,
            Schedule::Periodic { .. }
                | Schedule::Continuous
                | Schedule::PeriodicTransactional { .. }
        )
    }

    /// Returns a short stable label (snake_case) for use in logs and events.
    pub fn as_label(&self) -> &'static str {
        match self {
            Schedule::Once => "once",
            Schedule::Periodic { .. } => "periodic",
            Schedule::Continuous => "continuous",
            Schedule::Transactional => "transactional",
            Schedule::PeriodicTransactional { .. } => "periodic_transactional",
        }
    }
}
