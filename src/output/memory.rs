//! # In-memory collecting sink for demos and tests.
//!
//! [`MemorySink`] appends every delivered record to a vector. This is
//! primarily useful for development and examples; production sinks live
//! outside this crate.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::IngestError;
use crate::output::sink::Sink;

/// Sink that collects records in memory.
pub struct MemorySink<T> {
    records: Mutex<Vec<T>>,
}

impl<T> MemorySink<T> {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Number of records delivered so far.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been delivered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> MemorySink<T> {
    /// Returns a copy of everything delivered so far, in delivery order.
    pub fn records(&self) -> Vec<T> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T> Default for MemorySink<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Sink<T> for MemorySink<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn put(&self, record: T) -> Result<(), IngestError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}
