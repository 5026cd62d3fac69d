//! # Transaction: an ordered, atomically-committed batch of writes.
//!
//! A [`Transaction`] accumulates [`Saver`](crate::Saver)s in insertion
//! order and commits them with [`execute`](Transaction::execute).
//!
//! ## Commit semantics
//! - Operations run strictly in insertion order.
//! - The first failure aborts the batch: `execute` returns
//!   [`CommitError::Aborted`] naming the failing op, and operations after
//!   it are **never invoked**.
//! - An empty batch commits trivially.
//! - Physical atomicity (staging, rollback) is the sink's contract; the
//!   transaction sequences and reports.
//!
//! Timing transactions (created via
//! [`Manager::create_timing_transaction`](crate::Manager::create_timing_transaction))
//! additionally carry a repeat interval, and `execute` leaves the batch
//! intact so the same batch can be committed once per period.

use std::time::Duration;

use crate::error::CommitError;
use crate::output::saver::SaverRef;

/// Ordered batch of pending save operations.
pub struct Transaction {
    ops: Vec<SaverRef>,
    every: Option<Duration>,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self {
            ops: Vec::new(),
            every: None,
        }
    }

    pub(crate) fn with_every(every: Duration) -> Self {
        Self {
            ops: Vec::new(),
            every: Some(every),
        }
    }

    /// Appends a pending save operation; order is preserved through commit.
    pub fn add_saver(&mut self, op: SaverRef) {
        self.ops.push(op);
    }

    /// Returns the repeat interval for timing transactions.
    pub fn every(&self) -> Option<Duration> {
        self.every
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when no operations are pending.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drops all pending operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Commits the batch: every operation in order, stopping at the first
    /// failure.
    ///
    /// The batch is left intact, so a timing transaction can re-commit it
    /// each period; call [`clear`](Transaction::clear) to start a new batch.
    pub async fn execute(&self) -> Result<(), CommitError> {
        for (index, op) in self.ops.iter().enumerate() {
            op.save().await.map_err(|source| CommitError::Aborted {
                index,
                op: op.describe().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
