//! # Run a single invocation of a source.
//!
//! Executes one pull with panic and timeout isolation, delivers the record
//! to the sink (directly or through a one-record transaction), publishes
//! failure events to the [`Bus`], and routes failures to the source's
//! exception hook.
//!
//! ## Rules
//! - A panicking pull is caught here and surfaces as [`IngestError::Panic`];
//!   it can never unwind into the worker or the manager.
//! - The hook fires **exactly once** per failing invocation: pull failures
//!   carry no record, delivery and commit failures carry the produced one.
//! - [`IngestError::Canceled`] is a cooperative exit — no event beyond the
//!   worker's own terminal event, no hook.
//! - Each pull gets a child token; a timeout cancels only that child.

use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::IngestError;
use crate::events::{Bus, Event, EventKind};
use crate::output::{RecordSave, Transaction};
use crate::sources::{Source, SourceSpec};

use std::sync::Arc;

/// Executes one pull of `source`, isolating panics and applying the
/// optional timeout.
pub(crate) async fn pull_once<T>(
    source: &dyn Source<T>,
    parent: &CancellationToken,
    timeout: Option<Duration>,
    tick: u64,
    bus: &Bus,
) -> Result<T, IngestError>
where
    T: Clone + Send + Sync + 'static,
{
    let child = parent.child_token();
    let attempt = std::panic::AssertUnwindSafe(source.pull(child.clone())).catch_unwind();

    let res = if let Some(dur) = timeout.filter(|d| *d > Duration::ZERO) {
        match time::timeout(dur, attempt).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                bus.publish(
                    Event::now(EventKind::TimeoutHit)
                        .with_source(source.name())
                        .with_tick(tick)
                        .with_timeout(dur),
                );
                return Err(IngestError::Timeout { timeout: dur });
            }
        }
    } else {
        attempt.await
    };

    match res {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(e)) => {
            if !e.is_cancellation() {
                publish_pull_failed(bus, source.name(), tick, &e);
            }
            Err(e)
        }
        Err(payload) => {
            let message = panic_message(payload);
            let e = IngestError::Panic { message };
            publish_pull_failed(bus, source.name(), tick, &e);
            Err(e)
        }
    }
}

/// Pulls one record and delivers it straight to the sink.
pub(crate) async fn deliver_once<T>(
    spec: &SourceSpec<T>,
    parent: &CancellationToken,
    tick: u64,
    bus: &Bus,
) -> Result<(), IngestError>
where
    T: Clone + Send + Sync + 'static,
{
    let record = match pull_once(spec.source().as_ref(), parent, spec.timeout(), tick, bus).await {
        Ok(record) => record,
        Err(e) => {
            raise(spec, None, &e);
            return Err(e);
        }
    };

    if let Err(e) = spec.sink().put(record.clone()).await {
        bus.publish(
            Event::now(EventKind::DeliverFailed)
                .with_source(spec.name())
                .with_tick(tick)
                .with_reason(e.to_string()),
        );
        raise(spec, Some(&record), &e);
        return Err(e);
    }
    Ok(())
}

/// Pulls one record and commits it as its own atomic batch.
pub(crate) async fn commit_once<T>(
    spec: &SourceSpec<T>,
    parent: &CancellationToken,
    tick: u64,
    bus: &Bus,
) -> Result<(), IngestError>
where
    T: Clone + Send + Sync + 'static,
{
    let record = match pull_once(spec.source().as_ref(), parent, spec.timeout(), tick, bus).await {
        Ok(record) => record,
        Err(e) => {
            raise(spec, None, &e);
            return Err(e);
        }
    };

    let mut txn = Transaction::new();
    txn.add_saver(Arc::new(RecordSave::new(
        Arc::clone(spec.sink()),
        record.clone(),
    )));

    match txn.execute().await {
        Ok(()) => {
            bus.publish(
                Event::now(EventKind::CommitApplied)
                    .with_source(spec.name())
                    .with_tick(tick)
                    .with_ops(txn.len() as u32),
            );
            Ok(())
        }
        Err(commit) => {
            let e = IngestError::deliver(commit.to_string());
            bus.publish(
                Event::now(EventKind::CommitFailed)
                    .with_source(spec.name())
                    .with_tick(tick)
                    .with_reason(commit.to_string()),
            );
            raise(spec, Some(&record), &e);
            Err(e)
        }
    }
}

/// Routes a failure to the spec's exception hook; cancellation never counts.
fn raise<T: 'static>(spec: &SourceSpec<T>, record: Option<&T>, error: &IngestError) {
    if error.is_cancellation() {
        return;
    }
    if let Some(hook) = spec.hook() {
        hook.on_exception(record, error);
    }
}

fn publish_pull_failed(bus: &Bus, source: &str, tick: u64, error: &IngestError) {
    bus.publish(
        Event::now(EventKind::PullFailed)
            .with_source(source)
            .with_tick(tick)
            .with_reason(error.to_string()),
    );
}

/// Extracts a printable message from a caught panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
