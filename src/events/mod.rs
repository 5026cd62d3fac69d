//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the manager, registry,
//! and source workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Manager`, `Registry`, `Worker`, the invocation runner.
//! - **Consumers**: the manager's subscriber listener (fans out to every
//!   registered [`Subscriber`](crate::Subscriber)) and any receiver obtained
//!   from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
