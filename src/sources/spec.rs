//! # Registration parameters for a scheduled source.
//!
//! [`SourceSpec`] bundles everything the manager needs to schedule one
//! source: the source itself, its [`Schedule`], the output sink, an
//! optional exception hook, and an optional per-pull timeout.
//!
//! A spec is immutable once registration succeeds; changing behavior means
//! removing the source and registering a new spec.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::output::SinkRef;
use crate::policies::Schedule;
use crate::sources::hook::ExceptionRef;
use crate::sources::source::SourceRef;

/// Parameters for running a source under the manager.
///
/// Built with [`SourceSpec::new`] (no timeout, no hook) and refined with
/// the `with_*` builders, or with [`SourceSpec::with_defaults`] to inherit
/// the timeout from a [`Config`].
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use inflow::{IngestError, MemorySink, Schedule, SinkRef, SourceFn, SourceRef, SourceSpec};
///
/// let src: SourceRef<u64> = SourceFn::arc("meter", |_ctx: CancellationToken| async move {
///     Ok::<u64, IngestError>(1)
/// });
/// let sink: SinkRef<u64> = Arc::new(MemorySink::new());
///
/// let spec = SourceSpec::new(
///     src,
///     Schedule::Periodic {
///         every: Duration::from_secs(30),
///     },
///     sink,
/// )
/// .with_timeout(Some(Duration::from_secs(5)));
///
/// assert_eq!(spec.name(), "meter");
/// assert_eq!(spec.timeout(), Some(Duration::from_secs(5)));
/// ```
pub struct SourceSpec<T> {
    source: SourceRef<T>,
    schedule: Schedule,
    sink: SinkRef<T>,
    hook: Option<ExceptionRef<T>>,
    timeout: Option<Duration>,
}

impl<T> Clone for SourceSpec<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            schedule: self.schedule,
            sink: Arc::clone(&self.sink),
            hook: self.hook.clone(),
            timeout: self.timeout,
        }
    }
}

impl<T: 'static> SourceSpec<T> {
    /// Creates a new spec with no exception hook and no pull timeout.
    pub fn new(source: SourceRef<T>, schedule: Schedule, sink: SinkRef<T>) -> Self {
        Self {
            source,
            schedule,
            sink,
            hook: None,
            timeout: None,
        }
    }

    /// Creates a spec inheriting the pull timeout from a global config.
    ///
    /// Uses [`Config::default_timeout`] so that `0s` in config is treated
    /// as "no timeout".
    pub fn with_defaults(
        source: SourceRef<T>,
        schedule: Schedule,
        sink: SinkRef<T>,
        cfg: &Config,
    ) -> Self {
        Self::new(source, schedule, sink).with_timeout(cfg.default_timeout())
    }

    /// Returns a new spec with the given exception hook.
    pub fn with_hook(mut self, hook: ExceptionRef<T>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Returns a new spec with the given pull timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a reference to the source.
    pub fn source(&self) -> &SourceRef<T> {
        &self.source
    }

    /// Convenience: returns the source name.
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Returns the schedule.
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Returns a reference to the output sink.
    pub fn sink(&self) -> &SinkRef<T> {
        &self.sink
    }

    /// Returns the exception hook, if configured.
    pub fn hook(&self) -> Option<&ExceptionRef<T>> {
        self.hook.as_ref()
    }

    /// Returns the pull timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
