//! # inflow
//!
//! **Inflow** is a lightweight scheduling runtime for pluggable
//! data-ingestion sources.
//!
//! External producers ("sources") yield one record per invocation; the
//! [`Manager`] decides when and how often each source runs, routes produced
//! records to an output [`Sink`], and supports batching writes into an
//! atomic [`Transaction`]. The crate is designed as a building block for
//! higher-level ingestion services.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  SourceSpec  │   │  SourceSpec  │   │  SourceSpec  │
//!     │ (source #1)  │   │ (source #2)  │   │ (source #3)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Manager (runtime orchestrator)                                   │
//! │  - Registry (key → handle, status state machine)                  │
//! │  - Bus (broadcast events)                                         │
//! │  - Subscriber listener (fans out to user subscribers)             │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Worker    │   │    Worker    │   │    Worker    │
//!     │ (tick loop)  │   │ (tick loop)  │   │ (tick loop)  │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ pull → put       │ pull → commit    │ pull → put
//!      ▼                  ▼                  ▼
//!   Sink #1            Sink #2 (txn)      Sink #3
//! ```
//!
//! ### Lifecycle
//! ```text
//! add_source(spec) ──► Registry ──► Worker::run()
//!
//! per source:
//!   Normal ──► WaitingToRun ──► Running ──► Stopping ──► Stopped
//!                                  │
//!                                  └─ one-shot failure ──► ExceptionExit
//!
//! per invocation:
//!   pull (panic/timeout isolated)
//!     ├─ Ok  ──► sink.put() or Transaction::execute()
//!     │            └─ Err ──► exception hook(record, error)
//!     └─ Err ──► exception hook(None, error)
//!
//! exit conditions:
//!   - Once / Transactional completed (or failed)
//!   - runtime token cancelled (stop(), run-token, or remove_source)
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / traits                   |
//! |------------------|-----------------------------------------------------------|--------------------------------------|
//! | **Sources**      | Define producers as trait impls or closures.              | [`Source`], [`SourceFn`], [`SourceSpec`] |
//! | **Schedules**    | One-shot, periodic, continuous, transactional execution.  | [`Schedule`]                         |
//! | **Output**       | Deliver records to sinks, batch them atomically.          | [`Sink`], [`Saver`], [`Transaction`] |
//! | **Supervision**  | Register, remove, run, and stop sources as a group.       | [`Manager`]                          |
//! | **Subscribers**  | Hook into runtime events (logging, metrics, custom).      | [`Subscriber`], [`Bus`], [`Event`]   |
//! | **Errors**       | Typed errors for runtime, invocations, and commits.       | [`RuntimeError`], [`IngestError`], [`CommitError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use inflow::{
//!     Config, IngestError, Manager, MemorySink, Schedule, SinkRef, SourceFn, SourceRef,
//!     SourceSpec,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Arc::new(Manager::new(Config::default(), Vec::new()));
//!
//!     let mem = Arc::new(MemorySink::new());
//!     let sink: SinkRef<u64> = mem.clone();
//!     let meter: SourceRef<u64> = SourceFn::arc("meter", |_ctx: CancellationToken| async move {
//!         Ok::<u64, IngestError>(42)
//!     });
//!
//!     manager
//!         .add_source(SourceSpec::new(
//!             meter,
//!             Schedule::Periodic {
//!                 every: Duration::from_millis(500),
//!             },
//!             sink,
//!         ))
//!         .await?;
//!
//!     // Stop the whole runtime after two seconds.
//!     let token = CancellationToken::new();
//!     let stopper = token.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_secs(2)).await;
//!         stopper.cancel();
//!     });
//!
//!     manager.run(token).await?;
//!     println!("collected {} records", mem.len());
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod output;
mod policies;
mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::Manager;
pub use error::{CommitError, IngestError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use output::{MemorySink, RecordSave, Saver, SaverRef, Sink, SinkRef, Transaction};
pub use policies::Schedule;
pub use sources::{
    Exception, ExceptionRef, Source, SourceFn, SourceKey, SourceRef, SourceSpec, SourceStatus,
};
pub use subscribers::{LogWriter, Subscriber};
