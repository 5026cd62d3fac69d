//! # Closure-backed source (`SourceFn`)
//!
//! [`SourceFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing
//! a fresh future per pull. Each invocation owns its own state; shared state
//! between pulls must be an explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use inflow::{IngestError, SourceFn, SourceRef};
//!
//! let src: SourceRef<u64> = SourceFn::arc("answers", |_ctx: CancellationToken| async move {
//!     Ok::<u64, IngestError>(42)
//! });
//!
//! assert_eq!(src.name(), "answers");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::IngestError;
use crate::sources::source::Source;

/// Closure-backed source implementation.
///
/// Wraps a closure that *creates* a new future per pull.
#[derive(Debug)]
pub struct SourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SourceFn<F> {
    /// Creates a new closure-backed source.
    ///
    /// Prefer [`SourceFn::arc`] when you immediately need a
    /// [`SourceRef`](crate::SourceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Source<T> for SourceFn<F>
where
    T: Send + Sync + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, IngestError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn pull(&self, ctx: CancellationToken) -> Result<T, IngestError> {
        (self.f)(ctx).await
    }
}
