//! # Source abstractions and registration types.
//!
//! This module provides the producer-side types:
//! - [`Source`] — trait for implementing async, cancelable record producers
//! - [`SourceFn`] — closure-backed source implementation
//! - [`SourceRef`] — shared reference to a source (`Arc<dyn Source<T>>`)
//! - [`SourceSpec`] — registration parameters bundling a source with its
//!   schedule, sink, exception hook, and timeout
//! - [`SourceKey`] — opaque registry identifier
//! - [`SourceStatus`] — the source lifecycle state machine
//! - [`Exception`] — the per-source exception hook

mod hook;
mod key;
mod source;
mod source_fn;
mod spec;
mod status;

pub use hook::{Exception, ExceptionRef};
pub use key::SourceKey;
pub use source::{Source, SourceRef};
pub use source_fn::SourceFn;
pub use spec::SourceSpec;
pub use status::SourceStatus;

pub(crate) use status::StatusCell;
