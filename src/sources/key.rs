//! # Opaque registry key for registered sources.
//!
//! A [`SourceKey`] identifies one registry entry. Keys are minted from a
//! per-manager counter and are never reused within a process run, even
//! after the source is removed.

use std::fmt;

/// Opaque, unique identifier for a registered source.
///
/// Stable for the source's lifetime; formatting is intended for diagnostics
/// only, the numeric content carries no meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(u64);

impl SourceKey {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src-{}", self.0)
    }
}
