//! # Save operations: the units a transaction commits.
//!
//! A [`Saver`] is an opaque committable unit of work supplied by the
//! caller. The transaction only sequences and triggers it; whatever
//! visibility guarantees a save op needs are its own (or its sink's)
//! responsibility.
//!
//! [`RecordSave`] is the built-in bridge from a produced record to a sink:
//! committing it delivers the record via [`Sink::put`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::IngestError;
use crate::output::sink::SinkRef;

/// One pending write inside a [`Transaction`](crate::Transaction).
#[async_trait]
pub trait Saver: Send + Sync + 'static {
    /// Short description used in abort diagnostics.
    fn describe(&self) -> &str {
        "saver"
    }

    /// Applies this pending write.
    async fn save(&self) -> Result<(), IngestError>;
}

/// Shared handle to a save operation.
pub type SaverRef = Arc<dyn Saver>;

/// Save operation that delivers one produced record to a sink.
pub struct RecordSave<T> {
    sink: SinkRef<T>,
    record: T,
}

impl<T> RecordSave<T> {
    /// Wraps a record and its destination sink as a committable unit.
    pub fn new(sink: SinkRef<T>, record: T) -> Self {
        Self { sink, record }
    }
}

#[async_trait]
impl<T> Saver for RecordSave<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn describe(&self) -> &str {
        "record"
    }

    async fn save(&self) -> Result<(), IngestError> {
        self.sink.put(self.record.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    #[tokio::test]
    async fn record_save_delivers_to_sink() {
        let mem = Arc::new(MemorySink::new());
        let sink: SinkRef<u64> = mem.clone();

        let op = RecordSave::new(sink, 11);
        op.save().await.expect("save");
        op.save().await.expect("save twice");

        assert_eq!(mem.records(), vec![11, 11]);
        assert_eq!(op.describe(), "record");
    }
}
