//! # Worker: drives a single source per its schedule.
//!
//! One worker task per registered source. The worker owns the status
//! transitions of its entry and the tick loop for repeating schedules.
//!
//! ## Lifecycle
//! ```text
//! WaitingToRun ──► Running ──► [schedule loop] ──► Stopping ──► Stopped
//!                                    │
//!                                    └─ one-shot failure ──► ExceptionExit
//! ```
//!
//! ## Rules
//! - Invocations of one source are strictly sequential; the worker loop is
//!   the only caller.
//! - Cancellation is observed at iteration boundaries (and during periodic
//!   sleeps); a pull is never interrupted mid-flight.
//! - For repeating schedules a failed tick keeps the cadence — the hook
//!   already saw the failure and owns escalation.
//! - A failure that races shutdown resolves as a stop, not an exception
//!   exit ([`StatusCell`] refuses `ExceptionExit` outside `Running`).

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::runner::{commit_once, deliver_once};
use crate::error::IngestError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::Schedule;
use crate::sources::{SourceSpec, SourceStatus, StatusCell};

/// How a worker's schedule loop ended.
enum Exit {
    /// Completed or cooperatively cancelled.
    Clean,
    /// One-shot invocation failed.
    Faulted(String),
}

/// Drives one source until its schedule completes or cancellation wins.
pub(crate) struct Worker<T> {
    pub(crate) spec: SourceSpec<T>,
    pub(crate) status: Arc<StatusCell>,
    pub(crate) bus: Bus,
}

impl<T> Worker<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Runs the worker until completion or cancellation, then records the
    /// terminal status and publishes the terminal event.
    pub(crate) async fn run(self, token: CancellationToken) {
        if !self.status.advance(SourceStatus::Running) {
            // Removed or stopped before the first invocation.
            self.status.advance(SourceStatus::Stopped);
            return;
        }
        self.bus
            .publish(Event::now(EventKind::SourceStarting).with_source(self.spec.name()));

        let transactional = self.spec.schedule().is_transactional();
        let exit = match self.spec.schedule() {
            Schedule::Once | Schedule::Transactional => self.one_shot(&token, transactional).await,
            Schedule::Periodic { every } | Schedule::PeriodicTransactional { every } => {
                self.periodic(&token, every, transactional).await
            }
            Schedule::Continuous => self.continuous(&token).await,
        };

        match exit {
            Exit::Clean => {
                self.status.advance(SourceStatus::Stopping);
                self.status.advance(SourceStatus::Stopped);
                self.bus
                    .publish(Event::now(EventKind::SourceStopped).with_source(self.spec.name()));
            }
            Exit::Faulted(reason) => {
                if self.status.advance(SourceStatus::ExceptionExit) {
                    self.bus.publish(
                        Event::now(EventKind::SourceFaulted)
                            .with_source(self.spec.name())
                            .with_reason(reason),
                    );
                } else {
                    // Shutdown already in progress; resolve as a stop.
                    self.status.advance(SourceStatus::Stopped);
                    self.bus.publish(
                        Event::now(EventKind::SourceStopped).with_source(self.spec.name()),
                    );
                }
            }
        }
    }

    /// One invocation per tick, committed or delivered.
    async fn tick(
        &self,
        token: &CancellationToken,
        tick: u64,
        transactional: bool,
    ) -> Result<(), IngestError> {
        if transactional {
            commit_once(&self.spec, token, tick, &self.bus).await
        } else {
            deliver_once(&self.spec, token, tick, &self.bus).await
        }
    }

    async fn one_shot(&self, token: &CancellationToken, transactional: bool) -> Exit {
        match self.tick(token, 1, transactional).await {
            Ok(()) => Exit::Clean,
            Err(e) if e.is_cancellation() => Exit::Clean,
            Err(e) => Exit::Faulted(e.to_string()),
        }
    }

    async fn periodic(
        &self,
        token: &CancellationToken,
        every: Duration,
        transactional: bool,
    ) -> Exit {
        let mut n: u64 = 0;
        loop {
            if token.is_cancelled() {
                return Exit::Clean;
            }
            n += 1;
            if let Err(e) = self.tick(token, n, transactional).await {
                if e.is_cancellation() {
                    return Exit::Clean;
                }
                // Failed tick: hook already notified, keep the cadence.
            }

            let sleep = time::sleep(every);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => return Exit::Clean,
            }
        }
    }

    async fn continuous(&self, token: &CancellationToken) -> Exit {
        let mut n: u64 = 0;
        loop {
            if token.is_cancelled() {
                return Exit::Clean;
            }
            n += 1;
            if let Err(e) = self.tick(token, n, false).await {
                if e.is_cancellation() {
                    return Exit::Clean;
                }
            }
            // Let siblings and the control plane breathe between iterations.
            tokio::task::yield_now().await;
        }
    }
}
