//! # Optimistic Update Coordinator
//!
//! Applies user intents to local state immediately, then tries to deliver them
//! to the row store. Anything that cannot be delivered right now goes through
//! the [`ActionQueue`] and is drained when connectivity returns.
//!
//! ## Features
//!
//! - **Immediate Local Updates**: the local mutator runs before any network
//!   call and is never rolled back
//! - **Queue on Failure**: offline, or a failed online write, enqueues the
//!   mutation and emits [`SyncEvent::SavedOffline`]
//! - **Reconciling Drain**: a drain that empties the queue is followed by
//!   exactly one full fetch that replaces local data wholesale
//! - **Connectivity State Machine**: see [`ConnectivityState`]; a failed write
//!   never moves the coordinator offline
//! - **Event Channel**: every user-visible outcome goes out as a [`SyncEvent`]
//!   on a broadcast channel; nothing here renders anything
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use s3tracker::tracker::config::Config;
//! use s3tracker::tracker::local_store::{MemoryStore, PersistentStore};
//! use s3tracker::tracker::offline::{CoordinatorOptions, SyncCoordinator};
//! use s3tracker::tracker::row_client::{HttpRowClient, RemoteRowStore};
//!
//! # async fn example(config: Config) -> Result<(), s3tracker::shared::SyncError> {
//! let remote: Arc<dyn RemoteRowStore> = Arc::new(HttpRowClient::new(&config)?);
//! let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
//! let coordinator = SyncCoordinator::new(remote, store, CoordinatorOptions::from_config(&config)).await;
//!
//! let mut events = coordinator.subscribe();
//! coordinator.refresh().await?;
//! coordinator.toggle_item("Daily_Plan", 3, true).await;
//!
//! coordinator.set_online(false).await?;
//! coordinator.set_online(true).await?;
//! # Ok(())
//! # }
//! ```

use crate::shared::error::SyncError;
use crate::shared::event::SyncEvent;
use crate::shared::mutation::Mutation;
use crate::shared::sheet::SheetSnapshot;
use crate::tracker::config::Config;
use crate::tracker::local_store::PersistentStore;
use crate::tracker::offline::queue::{ActionQueue, DrainReport};
use crate::tracker::offline::reconciliation::IndexResolver;
use crate::tracker::row_client::RemoteRowStore;
use crate::tracker::state::{LoadStatus, TrackerState};
use crate::tracker::sync::{ConnectivityEvent, ConnectivityState, NetworkMonitor, NetworkStatus, SyncMetrics, SyncStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Buffered events per subscriber before the oldest are dropped
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Behaviour switches taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Re-resolve keyed mutations against a fresh snapshot while draining
    pub resolve_stale_indices: bool,
    /// Refetch after an add is written directly
    pub refetch_after_add: bool,
}

impl CoordinatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            resolve_stale_indices: config.resolve_stale_indices(),
            refetch_after_add: config.refetch_after_add(),
        }
    }
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            resolve_stale_indices: true,
            refetch_after_add: true,
        }
    }
}

/// Where an applied mutation ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The row store accepted it directly
    Written,
    /// It is waiting in the queue
    Queued { pending: usize },
}

/// Result of one `sync_pending` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub drain: DrainReport,
    /// Whether the follow-up full fetch succeeded
    pub reconciled: bool,
}

#[derive(Debug, Default)]
struct SyncHistory {
    last_sync: Option<String>,
    last_error: Option<String>,
}

/// Owns local tracker state and keeps it flowing to the row store
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteRowStore>,
    queue: ActionQueue,
    /// Only locked between awaits, so local mutations stay synchronous
    state: RwLock<TrackerState>,
    connectivity: Mutex<ConnectivityState>,
    network: NetworkMonitor,
    metrics: Mutex<SyncMetrics>,
    history: Mutex<SyncHistory>,
    events: broadcast::Sender<SyncEvent>,
    options: CoordinatorOptions,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SyncCoordinator {
    /// Create a coordinator, restoring any persisted queue from `store`.
    ///
    /// Starts online and idle; nothing is fetched or drained until asked.
    pub async fn new(
        remote: Arc<dyn RemoteRowStore>,
        store: Arc<dyn PersistentStore>,
        options: CoordinatorOptions,
    ) -> Self {
        let queue = ActionQueue::load(store).await;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            remote,
            queue,
            state: RwLock::new(TrackerState::new()),
            connectivity: Mutex::new(ConnectivityState::OnlineIdle),
            network: NetworkMonitor::new(NetworkStatus::Online),
            metrics: Mutex::new(SyncMetrics::new()),
            history: Mutex::new(SyncHistory::default()),
            events,
            options,
        }
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Sender half, for components that report through the same channel
    pub fn event_sender(&self) -> broadcast::Sender<SyncEvent> {
        self.events.clone()
    }

    fn emit(&self, event: SyncEvent) {
        tracing::debug!(?event, "sync event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Connectivity as last reported
    pub fn network(&self) -> &NetworkMonitor {
        &self.network
    }

    pub fn connectivity(&self) -> ConnectivityState {
        *lock(&self.connectivity)
    }

    pub fn is_online(&self) -> bool {
        self.connectivity().is_online()
    }

    fn transition(&self, event: ConnectivityEvent) -> (ConnectivityState, ConnectivityState) {
        let mut current = lock(&self.connectivity);
        let previous = *current;
        let next = previous.transition(event);
        *current = next;
        if previous != next {
            tracing::info!(from = ?previous, to = ?next, "connectivity state changed");
        }
        (previous, next)
    }

    /// Copy of the current tracker state
    pub fn state(&self) -> TrackerState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Copy of the current row snapshot
    pub fn snapshot(&self) -> SheetSnapshot {
        self.state.read().unwrap_or_else(PoisonError::into_inner).snapshot.clone()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.state.read().unwrap_or_else(PoisonError::into_inner).load_status.clone()
    }

    fn update_state<R>(&self, f: impl FnOnce(&mut TrackerState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub async fn pending_count(&self) -> usize {
        self.queue.len().await
    }

    /// Ordered copy of the pending queue
    pub async fn pending(&self) -> Vec<Mutation> {
        self.queue.snapshot().await
    }

    pub fn metrics(&self) -> SyncMetrics {
        lock(&self.metrics).clone()
    }

    pub async fn status(&self) -> SyncStatus {
        let pending_operations = self.queue.len().await;
        let history = lock(&self.history);
        SyncStatus {
            state: self.connectivity(),
            pending_operations,
            last_sync: history.last_sync.clone(),
            last_error: history.last_error.clone(),
        }
    }

    /// Apply a mutation locally, then deliver or queue it.
    ///
    /// `mutator` runs against the local snapshot before any network call and
    /// its effect stays regardless of the outcome.
    pub async fn apply<F>(&self, mutation: Mutation, mutator: F) -> ApplyOutcome
    where
        F: FnOnce(&mut SheetSnapshot) + Send,
    {
        self.update_state(|state| mutator(&mut state.snapshot));

        if self.is_online() {
            match self.remote.write_one(&mutation).await {
                Ok(()) => {
                    lock(&self.metrics).record_direct_write();
                    return ApplyOutcome::Written;
                }
                Err(e) => {
                    tracing::warn!(action = mutation.action(), "write failed, queueing: {}", e);
                    self.transition(ConnectivityEvent::WriteFailed);
                }
            }
        }

        let pending = self.queue.enqueue(mutation).await;
        lock(&self.metrics).record_queued_write();
        self.emit(SyncEvent::SavedOffline { pending });
        ApplyOutcome::Queued { pending }
    }

    fn row_key(&self, sheet_name: &str, row_index: usize) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.snapshot.item(sheet_name, row_index).map(|item| item.fingerprint())
    }

    fn keyed(&self, mutation: Mutation) -> Mutation {
        let key = mutation
            .row_index()
            .and_then(|row| self.row_key(mutation.sheet_name(), row));
        match key {
            Some(key) => mutation.with_row_key(key),
            None => mutation,
        }
    }

    /// Set an item's Done flag
    pub async fn toggle_item(&self, sheet_name: &str, row_index: usize, value: bool) -> ApplyOutcome {
        let mutation = self.keyed(Mutation::toggle(sheet_name, row_index, value));
        let local = mutation.clone();
        self.apply(mutation, move |snapshot| local.apply_locally(snapshot)).await
    }

    /// Add a topic under a module.
    ///
    /// The new row has no index until the row store assigns one, so nothing
    /// changes locally; a direct write is followed by a refetch.
    pub async fn add_item(&self, sheet_name: &str, module_num: u32, topic_name: &str) -> ApplyOutcome {
        let mutation = Mutation::add(sheet_name, module_num, topic_name);
        let local = mutation.clone();
        let outcome = self.apply(mutation, move |snapshot| local.apply_locally(snapshot)).await;

        if outcome == ApplyOutcome::Written && self.options.refetch_after_add {
            if let Err(e) = self.refresh().await {
                tracing::warn!("refetch after add failed: {}", e);
            }
        }
        outcome
    }

    /// Delete a topic row
    pub async fn delete_item(&self, sheet_name: &str, row_index: usize) -> ApplyOutcome {
        let mutation = self.keyed(Mutation::delete(sheet_name, row_index));
        let local = mutation.clone();
        self.apply(mutation, move |snapshot| local.apply_locally(snapshot)).await
    }

    /// Fetch every sheet and replace local data wholesale.
    ///
    /// On failure the previous data is kept and the load status carries the
    /// error.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.update_state(|state| state.load_status = LoadStatus::Loading);
        lock(&self.metrics).record_refetch();

        match self.remote.fetch_all().await {
            Ok(snapshot) => {
                self.update_state(|state| {
                    state.snapshot = snapshot;
                    state.load_status = LoadStatus::Loaded;
                });
                tracing::debug!("local data replaced from row store");
                self.emit(SyncEvent::DataRefreshed);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("failed to load rows: {}", message);
                self.update_state(|state| state.load_status = LoadStatus::Error(message.clone()));
                self.emit(SyncEvent::LoadFailed { message });
                Err(e)
            }
        }
    }

    /// Drain the queue, then reconcile with one full fetch if it emptied.
    ///
    /// Does nothing while offline or with an empty queue. A drain that stops
    /// early leaves the rest queued for the next trigger.
    pub async fn sync_pending(&self) -> Result<SyncReport, SyncError> {
        if !self.is_online() {
            tracing::debug!("sync requested while offline");
            return Ok(SyncReport::default());
        }
        let pending = self.queue.len().await;
        if pending == 0 {
            return Ok(SyncReport::default());
        }

        {
            let mut current = lock(&self.connectivity);
            if *current == ConnectivityState::OnlineIdle {
                *current = ConnectivityState::OnlineSyncing;
            }
        }

        let result = self.drain_and_reconcile(pending).await;
        if !matches!(result, Err(SyncError::DrainInProgress)) {
            self.transition(ConnectivityEvent::DrainFinished);
        }
        result
    }

    async fn drain_and_reconcile(&self, pending: usize) -> Result<SyncReport, SyncError> {
        if self.queue.is_draining() {
            return Err(SyncError::DrainInProgress);
        }
        tracing::info!(pending, "syncing offline queue");
        self.emit(SyncEvent::SyncStarted { pending });
        lock(&self.metrics).record_sync_start();

        let mut step = IndexResolver::new(Arc::clone(&self.remote), self.options.resolve_stale_indices);
        let drain = self.queue.drain(&mut step).await?;

        for discarded in &drain.discarded {
            self.emit(SyncEvent::MutationDiscarded {
                sheet_name: discarded.sheet_name().to_string(),
                row_index: discarded.row_index().unwrap_or_default(),
            });
        }

        if drain.is_complete() {
            lock(&self.metrics).record_sync_success(drain.written, drain.discarded.len());
            {
                let mut history = lock(&self.history);
                history.last_sync = Some(chrono::Utc::now().to_rfc3339());
                history.last_error = None;
            }
            tracing::info!(written = drain.written, "offline queue drained");
            self.emit(SyncEvent::SyncCompleted);

            let reconciled = self.refresh().await.is_ok();
            Ok(SyncReport { drain, reconciled })
        } else {
            let reason = drain
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::error!(remaining = drain.remaining, "sync stopped early: {}", reason);
            lock(&self.metrics).record_sync_stalled(drain.written, drain.discarded.len());
            lock(&self.history).last_error = Some(reason.clone());
            self.emit(SyncEvent::SyncStalled {
                remaining: drain.remaining,
                reason,
            });
            Ok(SyncReport { drain, reconciled: false })
        }
    }

    /// Feed a connectivity change into the state machine.
    ///
    /// Returns the sync report when coming online started a drain.
    pub async fn set_online(&self, online: bool) -> Result<Option<SyncReport>, SyncError> {
        self.network.set_status(NetworkStatus::from_online(online));

        if !online {
            self.transition(ConnectivityEvent::ConnectivityLost);
            return Ok(None);
        }

        let queue_empty = self.queue.is_empty().await;
        let (previous, next) = self.transition(ConnectivityEvent::ConnectivityRestored { queue_empty });
        if previous != ConnectivityState::Offline || next != ConnectivityState::OnlineSyncing {
            return Ok(None);
        }
        self.sync_pending().await.map(Some)
    }

    /// Follow an external connectivity signal until its sender is dropped
    pub fn spawn_connectivity_listener(
        self: &Arc<Self>,
        mut status: watch::Receiver<NetworkStatus>,
    ) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let online = status.borrow_and_update().is_online();
                if let Err(e) = coordinator.set_online(online).await {
                    tracing::warn!("connectivity change not handled: {}", e);
                }
            }
            tracing::debug!("connectivity listener stopped");
        })
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("connectivity", &self.connectivity())
            .field("queue", &self.queue)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
