//! # Execution policies for scheduled sources.
//!
//! This module provides [`Schedule`], the policy that determines when and
//! how often a registered source is invoked.

mod schedule;

pub use schedule::Schedule;
