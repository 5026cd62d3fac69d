//! # Registry: the live set of scheduled sources.
//!
//! Maps [`SourceKey`] to a handle holding the spec, the guarded status
//! cell, the worker's cancellation token, and its join handle. The manager
//! owns one registry; workers are spawned from here.
//!
//! ## Rules
//! - Mutations take the map's write lock, so operations on one key are
//!   mutually exclusive; reads proceed concurrently.
//! - Keys are minted by the manager and never reused in a process run.
//! - Launching is idempotent per entry: only a `Normal` entry can move to
//!   `WaitingToRun` and get a worker.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::worker::Worker;
use crate::events::{Bus, Event, EventKind};
use crate::sources::{SourceKey, SourceSpec, SourceStatus, StatusCell};

/// Handle to one registered source.
pub(crate) struct Handle<T> {
    pub(crate) spec: SourceSpec<T>,
    pub(crate) status: Arc<StatusCell>,
    /// Set once the worker is spawned.
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) join: Option<JoinHandle<()>>,
}

/// Key → handle map plus worker spawning.
pub(crate) struct Registry<T> {
    entries: RwLock<HashMap<SourceKey, Handle<T>>>,
    bus: Bus,
}

impl<T> Registry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(bus: Bus) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            bus,
        }
    }

    /// Inserts a new entry at `Normal` and publishes `SourceAdded`.
    pub(crate) async fn insert(&self, key: SourceKey, spec: SourceSpec<T>) {
        let name = spec.name().to_string();
        let handle = Handle {
            spec,
            status: Arc::new(StatusCell::new()),
            cancel: None,
            join: None,
        };
        self.entries.write().await.insert(key, handle);
        self.bus
            .publish(Event::now(EventKind::SourceAdded).with_source(name));
    }

    /// Spawns the worker for one entry, if it is still pending.
    pub(crate) async fn launch(&self, key: SourceKey, runtime: &CancellationToken) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&key) {
            Some(handle) => Self::launch_handle(handle, runtime, &self.bus),
            None => false,
        }
    }

    /// Spawns workers for every entry still at `Normal`; returns how many
    /// were started.
    pub(crate) async fn launch_pending(&self, runtime: &CancellationToken) -> usize {
        let mut entries = self.entries.write().await;
        let mut started = 0;
        for handle in entries.values_mut() {
            if Self::launch_handle(handle, runtime, &self.bus) {
                started += 1;
            }
        }
        started
    }

    fn launch_handle(handle: &mut Handle<T>, runtime: &CancellationToken, bus: &Bus) -> bool {
        if !handle.status.advance(SourceStatus::WaitingToRun) {
            return false;
        }
        let child = runtime.child_token();
        let worker = Worker {
            spec: handle.spec.clone(),
            status: Arc::clone(&handle.status),
            bus: bus.clone(),
        };
        handle.cancel = Some(child.clone());
        handle.join = Some(tokio::spawn(worker.run(child)));
        true
    }

    /// Removes and returns the handle; the entry is observably absent once
    /// this returns.
    pub(crate) async fn remove(&self, key: SourceKey) -> Option<Handle<T>> {
        self.entries.write().await.remove(&key)
    }

    pub(crate) async fn status(&self, key: SourceKey) -> Option<SourceStatus> {
        self.entries
            .read()
            .await
            .get(&key)
            .map(|handle| handle.status.get())
    }

    pub(crate) async fn contains(&self, key: SourceKey) -> bool {
        self.entries.read().await.contains_key(&key)
    }

    /// Returns all registered keys in mint order.
    pub(crate) async fn keys(&self) -> Vec<SourceKey> {
        let entries = self.entries.read().await;
        let mut keys: Vec<SourceKey> = entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Marks every non-terminal entry as stopping; entries that never got a
    /// worker are resolved to `Stopped` on the spot.
    pub(crate) async fn begin_stopping(&self) {
        let mut entries = self.entries.write().await;
        for handle in entries.values_mut() {
            if handle.status.get().is_terminal() {
                continue;
            }
            handle.status.advance(SourceStatus::Stopping);
            if handle.join.is_none() {
                handle.status.advance(SourceStatus::Stopped);
            }
        }
    }

    /// Takes every worker join handle, leaving the entries (and their
    /// statuses) in place for post-shutdown inspection.
    pub(crate) async fn take_joins(&self) -> Vec<JoinHandle<()>> {
        let mut entries = self.entries.write().await;
        entries
            .values_mut()
            .filter_map(|handle| handle.join.take())
            .collect()
    }

    /// Names of entries that have not reached a terminal status, sorted.
    pub(crate) async fn stuck(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut names: Vec<String> = entries
            .values()
            .filter(|handle| !handle.status.get().is_terminal())
            .map(|handle| handle.spec.name().to_string())
            .collect();
        names.sort_unstable();
        names
    }
}
