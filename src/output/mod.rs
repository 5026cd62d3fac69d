//! # Output side: sinks, save operations, and transactions.
//!
//! This module provides the consumer-side types:
//! - [`Sink`] — trait for delivering one record per call, [`SinkRef`]
//! - [`Saver`] — an opaque committable unit of work, [`SaverRef`]
//! - [`RecordSave`] — bridges a produced record to a sink as a save op
//! - [`Transaction`] — an ordered batch of save ops committed as a unit
//! - [`MemorySink`] — built-in collecting sink for demos and tests

mod memory;
mod saver;
mod sink;
mod transaction;

pub use memory::MemorySink;
pub use saver::{RecordSave, Saver, SaverRef};
pub use sink::{Sink, SinkRef};
pub use transaction::Transaction;
