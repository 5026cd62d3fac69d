//! # Global runtime configuration.
//!
//! [`Config`] defines the manager's behavior: shutdown grace period,
//! event bus capacity, and the default per-pull timeout inherited by
//! source specifications built with
//! [`SourceSpec::with_defaults`](crate::SourceSpec::with_defaults).

use std::time::Duration;

/// Global configuration for the manager.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for sources to stop during graceful shutdown.
    pub grace: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Default per-pull timeout (0 = no timeout).
    pub timeout: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `timeout = 0s` (no timeout)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            timeout: Duration::from_secs(0),
        }
    }
}

impl Config {
    /// Returns the default pull timeout, treating `0s` as "no timeout".
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }
}
