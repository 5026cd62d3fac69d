//! # Manager: orchestrates source scheduling, delivery, and shutdown.
//!
//! The [`Manager`] owns the registry and every source's lifecycle state. It
//! creates transactions, registers/unregisters sources, runs the scheduling
//! loops until stopped, and exposes a synchronous-feeling stop operation.
//!
//! ## High-level architecture
//! ```text
//! add_source(spec) ──► Registry ──► Worker (one task per source)
//!                                      │
//!                                      ├─ Schedule::Once / Transactional
//!                                      │      pull → deliver/commit → exit
//!                                      └─ Schedule::Periodic / Continuous / ...
//!                                             pull → deliver/commit → wait → repeat
//!
//! Worker ── publish(Event) ──► Bus ──► listener ──► Subscriber set
//!
//! Shutdown path (stop() or run-token cancelled):
//!   publish(ShutdownRequested)
//!     └─► Registry::begin_stopping()      (statuses → Stopping)
//!     └─► runtime_token.cancel()          (propagates to child tokens)
//!     └─► join workers within Config::grace:
//!            ├─ Ok      → publish(AllStoppedWithin)
//!            └─ Timeout → publish(GraceExceeded),
//!                         Err(GraceExceeded { stuck }) names the offenders
//! ```
//!
//! ## Rules
//! - A failing or panicking source can never take down the manager or its
//!   sibling sources; failures are routed to the per-source exception hook.
//! - `stop` and a cancelled `run` token converge on one shared shutdown
//!   result; both are safe to trigger concurrently and idempotent.
//! - The grace bound is cooperative: a source that ignores cancellation is
//!   reported by name, not interrupted.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use inflow::{
//!     Config, IngestError, LogWriter, Manager, MemorySink, Schedule, SinkRef, SourceFn,
//!     SourceRef, SourceSpec, Subscriber,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscriber>> = vec![Arc::new(LogWriter)];
//!     let manager = Arc::new(Manager::new(Config::default(), subs));
//!
//!     let sink: SinkRef<u64> = Arc::new(MemorySink::new());
//!     let meter: SourceRef<u64> = SourceFn::arc("meter", |_ctx: CancellationToken| async move {
//!         Ok::<u64, IngestError>(1)
//!     });
//!     manager
//!         .add_source(SourceSpec::new(
//!             meter,
//!             Schedule::Periodic {
//!                 every: Duration::from_secs(30),
//!             },
//!             sink,
//!         ))
//!         .await?;
//!
//!     manager.run_until_signal().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::sync::broadcast::error::RecvError;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::registry::Registry;
use crate::core::shutdown;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::output::Transaction;
use crate::sources::{SourceKey, SourceSpec, SourceStatus};
use crate::subscribers::Subscriber;

/// Orchestrator for scheduled ingestion sources.
///
/// Generic over the record type `T` flowing from sources to sinks.
pub struct Manager<T> {
    cfg: Config,
    bus: Bus,
    subscribers: Arc<Vec<Arc<dyn Subscriber>>>,
    registry: Registry<T>,
    /// Cancelled exactly once, on shutdown; parents every worker token.
    runtime: CancellationToken,
    key_seq: AtomicU64,
    active: AtomicBool,
    listener: AtomicBool,
    shutdown: OnceCell<Result<(), RuntimeError>>,
}

impl<T> Manager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a manager with the given config and event subscribers.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscriber>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self {
            registry: Registry::new(bus.clone()),
            subscribers: Arc::new(subscribers),
            runtime: CancellationToken::new(),
            key_seq: AtomicU64::new(1),
            active: AtomicBool::new(false),
            listener: AtomicBool::new(false),
            shutdown: OnceCell::new(),
            bus,
            cfg,
        }
    }

    /// Returns the event bus, e.g. to attach an ad-hoc receiver.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Creates a fresh, empty transaction.
    pub fn create_transaction(&self) -> Transaction {
        Transaction::new()
    }

    /// Creates a fresh transaction tagged with a repeat interval.
    ///
    /// The batch itself is passive; committing once per period is driven
    /// either by the caller or by registering a source under
    /// [`Schedule::PeriodicTransactional`](crate::Schedule).
    pub fn create_timing_transaction(&self, every: Duration) -> Transaction {
        Transaction::with_every(every)
    }

    /// Registers a source and returns its key.
    ///
    /// Validation is synchronous: periodic schedules require a non-zero
    /// interval, and a shut-down manager accepts no further sources.
    /// Scheduling is asynchronous — if the run loop is active the worker
    /// starts immediately, otherwise it starts when [`run`](Manager::run)
    /// is invoked.
    pub async fn add_source(&self, spec: SourceSpec<T>) -> Result<SourceKey, RuntimeError> {
        if spec.schedule().every().is_some_and(|every| every.is_zero()) {
            return Err(RuntimeError::InvalidInterval {
                source_name: spec.name().to_string(),
            });
        }
        if self.runtime.is_cancelled() {
            return Err(RuntimeError::Terminated);
        }

        let key = SourceKey::new(self.key_seq.fetch_add(1, Ordering::Relaxed));
        self.registry.insert(key, spec).await;
        if self.active.load(Ordering::Acquire) {
            self.registry.launch(key, &self.runtime).await;
        }
        Ok(key)
    }

    /// Unregisters a source; returns whether the key was present.
    ///
    /// The entry is observably absent from the registry once this returns.
    /// The worker is cancelled, then reaped on a detached task — no further
    /// invocations start after the cancel, but an in-flight pull is allowed
    /// to finish on its own.
    pub async fn remove_source(&self, key: SourceKey) -> bool {
        let Some(mut handle) = self.registry.remove(key).await else {
            return false;
        };
        let name = handle.spec.name().to_string();

        handle.status.advance(SourceStatus::Stopping);
        if let Some(cancel) = handle.cancel.take() {
            cancel.cancel();
        }

        let bus = self.bus.clone();
        let status = Arc::clone(&handle.status);
        let join = handle.join.take();
        tokio::spawn(async move {
            if let Some(join) = join {
                let _ = join.await;
            }
            status.advance(SourceStatus::Stopped);
            bus.publish(Event::now(EventKind::SourceRemoved).with_source(name));
        });
        true
    }

    /// Returns the current status of a registered source.
    pub async fn status(&self, key: SourceKey) -> Option<SourceStatus> {
        self.registry.status(key).await
    }

    /// Returns whether the key is present in the registry.
    pub async fn contains(&self, key: SourceKey) -> bool {
        self.registry.contains(key).await
    }

    /// Returns all registered keys in mint order.
    pub async fn list(&self) -> Vec<SourceKey> {
        self.registry.keys().await
    }

    /// True while the run loop is active and shutdown has not begun.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire) && !self.runtime.is_cancelled()
    }

    /// Runs the scheduling loops until `token` is cancelled or
    /// [`stop`](Manager::stop) is invoked.
    ///
    /// Starts the worker of every registered source not yet started and
    /// blocks the caller. Both exit paths converge on the same graceful
    /// shutdown and return its result.
    pub async fn run(&self, token: CancellationToken) -> Result<(), RuntimeError> {
        if self.runtime.is_cancelled() {
            return Err(RuntimeError::Terminated);
        }
        if self.active.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }

        self.subscriber_listener();
        self.registry.launch_pending(&self.runtime).await;

        tokio::select! {
            _ = token.cancelled() => {}
            _ = self.runtime.cancelled() => {}
        }
        self.graceful_shutdown().await
    }

    /// Runs until the process receives a termination signal (SIGINT/SIGTERM).
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            if shutdown::wait_for_termination().await.is_ok() {
                trigger.cancel();
            }
        });
        self.run(token).await
    }

    /// Requests graceful shutdown of all sources and waits for them.
    ///
    /// Safe to invoke concurrently with `run` cancellation or repeated
    /// `stop` calls: every caller observes the one shared result. Returns
    /// [`RuntimeError::GraceExceeded`] naming the sources that ignored
    /// cancellation within [`Config::grace`].
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        self.graceful_shutdown().await
    }

    async fn graceful_shutdown(&self) -> Result<(), RuntimeError> {
        self.shutdown
            .get_or_init(|| self.do_shutdown())
            .await
            .clone()
    }

    async fn do_shutdown(&self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.registry.begin_stopping().await;
        self.runtime.cancel();

        let joins = self.registry.take_joins().await;
        let drain = async {
            for join in joins {
                let _ = join.await;
            }
        };

        match time::timeout(self.cfg.grace, drain).await {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_elapsed) => {
                let stuck = self.registry.stuck().await;
                self.bus.publish(
                    Event::now(EventKind::GraceExceeded).with_reason(format!("stuck={stuck:?}")),
                );
                Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    stuck,
                })
            }
        }
    }

    /// Forwards bus events to the subscriber set on a dedicated task.
    fn subscriber_listener(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        if self.listener.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut rx = self.bus.subscribe();
        let subscribers = Arc::clone(&self.subscribers);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        for sub in subscribers.iter() {
                            sub.handle(&ev).await;
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::output::{MemorySink, Sink, SinkRef};
    use crate::policies::Schedule;
    use crate::sources::{ExceptionRef, SourceFn, SourceRef};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicU64;
    use tokio::task::JoinHandle;

    fn test_cfg() -> Config {
        Config {
            grace: Duration::from_millis(500),
            bus_capacity: 256,
            timeout: Duration::ZERO,
        }
    }

    fn counting_source(name: &'static str, count: &Arc<AtomicU64>) -> SourceRef<u64> {
        let count = Arc::clone(count);
        SourceFn::arc(name, move |_ctx: CancellationToken| {
            let count = Arc::clone(&count);
            async move { Ok::<u64, IngestError>(count.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    fn memory() -> (Arc<MemorySink<u64>>, SinkRef<u64>) {
        let mem = Arc::new(MemorySink::new());
        let sink: SinkRef<u64> = mem.clone();
        (mem, sink)
    }

    fn spawn_run(
        mgr: &Arc<Manager<u64>>,
        token: &CancellationToken,
    ) -> JoinHandle<Result<(), RuntimeError>> {
        let mgr = Arc::clone(mgr);
        let token = token.clone();
        tokio::spawn(async move { mgr.run(token).await })
    }

    struct RejectSink;

    #[async_trait]
    impl Sink<u64> for RejectSink {
        async fn put(&self, _record: u64) -> Result<(), IngestError> {
            Err(IngestError::deliver("no room"))
        }
    }

    #[tokio::test]
    async fn concurrent_adds_mint_distinct_keys() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let mut handles = Vec::new();
        for i in 0..8 {
            let mgr = Arc::clone(&mgr);
            handles.push(tokio::spawn(async move {
                let (_, sink) = memory();
                let count = Arc::new(AtomicU64::new(i));
                let src = counting_source("minted", &count);
                mgr.add_source(SourceSpec::new(src, Schedule::Once, sink))
                    .await
                    .expect("add")
            }));
        }

        let mut keys = HashSet::new();
        for handle in handles {
            keys.insert(handle.await.expect("join"));
        }
        assert_eq!(keys.len(), 8);
        assert_eq!(mgr.list().await.len(), 8);
    }

    #[tokio::test]
    async fn once_source_pulls_exactly_once() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (mem, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));
        let key = mgr
            .add_source(SourceSpec::new(
                counting_source("one-shot", &count),
                Schedule::Once,
                sink,
            ))
            .await
            .expect("add");
        assert_eq!(mgr.status(key).await, Some(SourceStatus::Normal));

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(80)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(mem.records(), vec![1]);
        assert_eq!(mgr.status(key).await, Some(SourceStatus::Stopped));

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn periodic_source_keeps_cadence_without_overlap() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (mem, sink) = memory();

        let busy = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicU64::new(0));
        let count = Arc::new(AtomicU64::new(0));
        let src: SourceRef<u64> = {
            let busy = Arc::clone(&busy);
            let overlaps = Arc::clone(&overlaps);
            let count = Arc::clone(&count);
            SourceFn::arc("ticker", move |_ctx: CancellationToken| {
                let busy = Arc::clone(&busy);
                let overlaps = Arc::clone(&overlaps);
                let count = Arc::clone(&count);
                async move {
                    if busy.swap(true, Ordering::SeqCst) {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    time::sleep(Duration::from_millis(5)).await;
                    busy.store(false, Ordering::SeqCst);
                    Ok::<u64, IngestError>(count.fetch_add(1, Ordering::SeqCst) + 1)
                }
            })
        };

        mgr.add_source(SourceSpec::new(
            src,
            Schedule::Periodic {
                every: Duration::from_millis(20),
            },
            sink,
        ))
        .await
        .expect("add");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(150)).await;

        mgr.stop().await.expect("graceful stop");
        let ticks = count.load(Ordering::SeqCst);
        assert!(
            (2..=12).contains(&ticks),
            "unexpected tick count: {ticks}"
        );
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(mem.len(), ticks as usize);

        // No further invocations after stop returned.
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticks);

        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let mgr = Manager::new(test_cfg(), Vec::new());
        let (_, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));

        let err = mgr
            .add_source(SourceSpec::new(
                counting_source("bad", &count),
                Schedule::PeriodicTransactional {
                    every: Duration::ZERO,
                },
                sink,
            ))
            .await
            .expect_err("zero interval must be rejected");
        assert!(matches!(
            err,
            RuntimeError::InvalidInterval { ref source_name } if source_name == "bad"
        ));
        assert!(mgr.list().await.is_empty());
    }

    #[tokio::test]
    async fn removal_is_observable_immediately() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (_, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));
        let key = mgr
            .add_source(SourceSpec::new(
                counting_source("removable", &count),
                Schedule::Periodic {
                    every: Duration::from_millis(10),
                },
                sink,
            ))
            .await
            .expect("add");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(40)).await;
        assert!(count.load(Ordering::SeqCst) >= 1);

        assert!(mgr.remove_source(key).await);
        assert!(!mgr.contains(key).await);
        assert_eq!(mgr.status(key).await, None);
        assert!(!mgr.remove_source(key).await, "second removal is a no-op");

        // At most one in-flight invocation may still finish.
        let after_remove = count.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(50)).await;
        assert!(count.load(Ordering::SeqCst) <= after_remove + 1);

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn failing_source_is_isolated_from_siblings() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (_, sink) = memory();

        let hook_calls = Arc::new(AtomicU64::new(0));
        let hook: ExceptionRef<u64> = {
            let hook_calls = Arc::clone(&hook_calls);
            Arc::new(move |record: Option<&u64>, error: &IngestError| {
                assert!(record.is_none());
                assert_eq!(error.as_label(), "pull_failed");
                hook_calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        let broken: SourceRef<u64> = SourceFn::arc("broken", |_ctx: CancellationToken| async {
            Err::<u64, IngestError>(IngestError::fail("upstream gone"))
        });
        let broken_key = mgr
            .add_source(SourceSpec::new(broken, Schedule::Once, sink.clone()).with_hook(hook))
            .await
            .expect("add broken");

        let healthy_count = Arc::new(AtomicU64::new(0));
        mgr.add_source(SourceSpec::new(
            counting_source("healthy", &healthy_count),
            Schedule::Periodic {
                every: Duration::from_millis(15),
            },
            sink,
        ))
        .await
        .expect("add healthy");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(90)).await;

        assert_eq!(hook_calls.load(Ordering::SeqCst), 1, "hook fires once");
        assert_eq!(
            mgr.status(broken_key).await,
            Some(SourceStatus::ExceptionExit)
        );
        assert!(
            healthy_count.load(Ordering::SeqCst) >= 2,
            "sibling kept its schedule"
        );

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn panicking_source_is_contained() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (_, sink) = memory();

        let labels = Arc::new(StdMutex::new(Vec::new()));
        let hook: ExceptionRef<u64> = {
            let labels = Arc::clone(&labels);
            Arc::new(move |_record: Option<&u64>, error: &IngestError| {
                labels.lock().unwrap().push(error.as_label());
            })
        };
        async fn explode(_ctx: CancellationToken) -> Result<u64, IngestError> {
            panic!("pulled the pin")
        }
        let bomb: SourceRef<u64> = SourceFn::arc("bomb", explode);
        let key = mgr
            .add_source(SourceSpec::new(bomb, Schedule::Once, sink).with_hook(hook))
            .await
            .expect("add");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(60)).await;

        assert_eq!(mgr.status(key).await, Some(SourceStatus::ExceptionExit));
        assert_eq!(*labels.lock().unwrap(), vec!["pull_panicked"]);

        token.cancel();
        run.await.expect("join").expect("panic stays contained");
    }

    #[tokio::test]
    async fn stop_names_the_source_that_ignores_cancellation() {
        let cfg = Config {
            grace: Duration::from_millis(80),
            ..test_cfg()
        };
        let mgr = Arc::new(Manager::new(cfg, Vec::new()));
        let (_, sink) = memory();

        let stubborn: SourceRef<u64> =
            SourceFn::arc("stubborn", |_ctx: CancellationToken| async {
                time::sleep(Duration::from_secs(600)).await;
                Ok::<u64, IngestError>(0)
            });
        mgr.add_source(SourceSpec::new(stubborn, Schedule::Once, sink.clone()))
            .await
            .expect("add stubborn");

        let polite_count = Arc::new(AtomicU64::new(0));
        mgr.add_source(SourceSpec::new(
            counting_source("polite", &polite_count),
            Schedule::Periodic {
                every: Duration::from_millis(10),
            },
            sink,
        ))
        .await
        .expect("add polite");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(30)).await;

        let err = mgr.stop().await.expect_err("stubborn must exceed grace");
        match err {
            RuntimeError::GraceExceeded { stuck, .. } => {
                assert_eq!(stuck, vec!["stubborn".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }

        // run() observes the same shared shutdown result.
        let res = run.await.expect("join");
        assert!(matches!(res, Err(RuntimeError::GraceExceeded { .. })));
    }

    #[tokio::test]
    async fn transactional_source_commits_one_batch() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (mem, sink) = memory();
        let mut rx = mgr.bus().subscribe();

        let answer: SourceRef<u64> = SourceFn::arc("answer", |_ctx: CancellationToken| async {
            Ok::<u64, IngestError>(7)
        });
        let key = mgr
            .add_source(SourceSpec::new(answer, Schedule::Transactional, sink))
            .await
            .expect("add");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(60)).await;

        assert_eq!(mem.records(), vec![7]);
        assert_eq!(mgr.status(key).await, Some(SourceStatus::Stopped));

        let mut committed = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::CommitApplied {
                assert_eq!(ev.ops, Some(1));
                committed = true;
            }
        }
        assert!(committed, "CommitApplied must be published");

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn periodic_transactional_commits_in_tick_order() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (mem, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));

        mgr.add_source(SourceSpec::new(
            counting_source("batcher", &count),
            Schedule::PeriodicTransactional {
                every: Duration::from_millis(20),
            },
            sink,
        ))
        .await
        .expect("add");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(110)).await;
        mgr.stop().await.expect("graceful stop");

        let records = mem.records();
        assert!(records.len() >= 2, "expected several commits: {records:?}");
        // One batch per tick, committed in tick order.
        let expected: Vec<u64> = (1..=records.len() as u64).collect();
        assert_eq!(records, expected);

        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn sink_rejection_reaches_hook_and_keeps_cadence() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let sink: SinkRef<u64> = Arc::new(RejectSink);

        let rejected = Arc::new(AtomicU64::new(0));
        let hook: ExceptionRef<u64> = {
            let rejected = Arc::clone(&rejected);
            Arc::new(move |record: Option<&u64>, error: &IngestError| {
                assert!(record.is_some(), "delivery failures carry the record");
                assert_eq!(error.as_label(), "deliver_failed");
                rejected.fetch_add(1, Ordering::SeqCst);
            })
        };
        let count = Arc::new(AtomicU64::new(0));
        mgr.add_source(
            SourceSpec::new(
                counting_source("unwanted", &count),
                Schedule::Periodic {
                    every: Duration::from_millis(15),
                },
                sink,
            )
            .with_hook(hook),
        )
        .await
        .expect("add");

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(80)).await;

        assert!(count.load(Ordering::SeqCst) >= 2, "cadence survives rejects");
        assert_eq!(
            rejected.load(Ordering::SeqCst),
            count.load(Ordering::SeqCst),
            "one hook call per rejected delivery"
        );

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn source_added_while_running_is_scheduled() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(20)).await;

        let (mem, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));
        let key = mgr
            .add_source(SourceSpec::new(
                counting_source("late", &count),
                Schedule::Once,
                sink,
            ))
            .await
            .expect("add while running");

        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(mem.records(), vec![1]);
        assert_eq!(mgr.status(key).await, Some(SourceStatus::Stopped));

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn stopped_manager_rejects_further_use() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let (_, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));
        let key = mgr
            .add_source(SourceSpec::new(
                counting_source("never-ran", &count),
                Schedule::Continuous,
                sink.clone(),
            ))
            .await
            .expect("add");

        mgr.stop().await.expect("stop before run");
        assert!(!mgr.is_running());
        assert_eq!(mgr.status(key).await, Some(SourceStatus::Stopped));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let err = mgr
            .add_source(SourceSpec::new(
                counting_source("too-late", &count),
                Schedule::Once,
                sink,
            ))
            .await
            .expect_err("registration after shutdown");
        assert!(matches!(err, RuntimeError::Terminated));

        let err = mgr
            .run(CancellationToken::new())
            .await
            .expect_err("run after shutdown");
        assert!(matches!(err, RuntimeError::Terminated));

        // stop stays idempotent.
        mgr.stop().await.expect("repeat stop");
    }

    #[tokio::test]
    async fn second_concurrent_run_is_rejected() {
        let mgr = Arc::new(Manager::new(test_cfg(), Vec::new()));
        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(20)).await;
        assert!(mgr.is_running());

        let err = mgr
            .run(CancellationToken::new())
            .await
            .expect_err("second run");
        assert!(matches!(err, RuntimeError::AlreadyRunning));

        token.cancel();
        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn subscribers_observe_lifecycle_events() {
        struct KindCollector(StdMutex<Vec<EventKind>>);

        #[async_trait]
        impl Subscriber for KindCollector {
            async fn handle(&self, event: &Event) {
                self.0.lock().unwrap().push(event.kind);
            }
        }

        let collector = Arc::new(KindCollector(StdMutex::new(Vec::new())));
        let subs: Vec<Arc<dyn Subscriber>> = vec![collector.clone()];
        let mgr = Arc::new(Manager::new(test_cfg(), subs));

        let token = CancellationToken::new();
        let run = spawn_run(&mgr, &token);
        time::sleep(Duration::from_millis(20)).await;

        let (_, sink) = memory();
        let count = Arc::new(AtomicU64::new(0));
        mgr.add_source(SourceSpec::new(
            counting_source("observed", &count),
            Schedule::Once,
            sink,
        ))
        .await
        .expect("add");

        time::sleep(Duration::from_millis(50)).await;
        mgr.stop().await.expect("stop");
        time::sleep(Duration::from_millis(30)).await;

        let kinds = collector.0.lock().unwrap().clone();
        for expected in [
            EventKind::SourceAdded,
            EventKind::SourceStarting,
            EventKind::SourceStopped,
            EventKind::ShutdownRequested,
            EventKind::AllStoppedWithin,
        ] {
            assert!(kinds.contains(&expected), "missing {expected:?} in {kinds:?}");
        }

        run.await.expect("join").expect("clean run");
    }

    #[tokio::test]
    async fn timing_transactions_carry_their_interval() {
        let mgr: Manager<u64> = Manager::new(test_cfg(), Vec::new());
        assert_eq!(mgr.create_transaction().every(), None);
        assert_eq!(
            mgr.create_timing_transaction(Duration::from_secs(2)).every(),
            Some(Duration::from_secs(2))
        );
    }
}
