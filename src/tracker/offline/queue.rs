//! # Action Queue
//!
//! Durable, ordered list of mutations that still have to reach the row store.
//!
//! ## Features
//!
//! - **Persistent Queue**: the full ordered contents are written to the local
//!   store on every enqueue and after every successful drain step
//! - **Strict FIFO Drain**: the oldest mutation is always attempted first and a
//!   failure stops the drain, leaving it and everything after it in place
//! - **Single Flight**: only one drain runs at a time; a second request while
//!   one is in progress gets [`SyncError::DrainInProgress`]
//!
//! A crash between a successful remote write and the persist that removes it
//! replays that mutation on the next drain (at-least-once delivery).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use s3tracker::shared::Mutation;
//! use s3tracker::tracker::local_store::{MemoryStore, PersistentStore};
//! use s3tracker::tracker::offline::ActionQueue;
//!
//! # async fn example(step: &mut impl s3tracker::tracker::offline::DrainStep) {
//! let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
//! let queue = ActionQueue::load(store).await;
//!
//! queue.enqueue(Mutation::toggle("Daily_Plan", 3, true)).await;
//! let report = queue.drain(step).await;
//! # }
//! ```

use crate::shared::error::SyncError;
use crate::shared::mutation::Mutation;
use crate::tracker::local_store::{PersistentStore, QUEUE_KEY};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One drain step: deliver a mutation to the row store
#[async_trait]
pub trait DrainStep: Send {
    async fn write(&mut self, mutation: &Mutation) -> Result<(), SyncError>;
}

/// Outcome of a drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Mutations delivered and removed
    pub written: usize,
    /// Mutations dropped because their target row no longer exists
    pub discarded: Vec<Mutation>,
    /// Mutations left in the queue
    pub remaining: usize,
    /// Failure that stopped the drain, if any
    pub error: Option<SyncError>,
}

impl DrainReport {
    /// Whether the queue ended empty
    pub fn is_complete(&self) -> bool {
        self.remaining == 0 && self.error.is_none()
    }
}

/// Durable FIFO of pending mutations
pub struct ActionQueue {
    store: Arc<dyn PersistentStore>,
    pending: Mutex<VecDeque<Mutation>>,
    draining: AtomicBool,
}

/// Clears the in-progress flag when a drain ends, however it ends
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ActionQueue {
    /// Restore the persisted queue; unreadable data yields an empty queue
    pub async fn load(store: Arc<dyn PersistentStore>) -> Self {
        let restored: Vec<Mutation> = store.load_or_default(QUEUE_KEY).await;
        if !restored.is_empty() {
            tracing::info!(pending = restored.len(), "restored offline queue");
        }
        Self {
            store,
            pending: Mutex::new(restored.into()),
            draining: AtomicBool::new(false),
        }
    }

    async fn persist(&self, pending: &VecDeque<Mutation>) -> Result<(), SyncError> {
        let ordered: Vec<Mutation> = pending.iter().cloned().collect();
        self.store.save(QUEUE_KEY, &ordered).await
    }

    /// Append a mutation and persist the queue.
    ///
    /// Never fails: if the write to local storage fails the mutation is still
    /// kept in memory and the failure is logged. Returns the new length.
    pub async fn enqueue(&self, mutation: Mutation) -> usize {
        let mut pending = self.pending.lock().await;
        pending.push_back(mutation);
        if let Err(e) = self.persist(&pending).await {
            tracing::error!("failed to persist offline queue: {}", e);
        }
        tracing::debug!(pending = pending.len(), "queued mutation");
        pending.len()
    }

    /// Attempt queued mutations oldest-first.
    ///
    /// Each success removes the mutation and persists the queue before the next
    /// attempt. The first transient failure stops the drain. A
    /// [`SyncError::StaleIndex`] drops that mutation and continues. A failed
    /// persist also stops the drain and is reported in [`DrainReport::error`];
    /// the next enqueue or drain step rewrites the stored queue.
    pub async fn drain<W: DrainStep + ?Sized>(&self, step: &mut W) -> Result<DrainReport, SyncError> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("drain requested while another drain is running");
            return Err(SyncError::DrainInProgress);
        }
        let _guard = DrainGuard(&self.draining);

        let mut report = DrainReport::default();
        loop {
            // The lock is not held across the remote call so user actions can
            // keep enqueueing; only this drain removes from the front.
            let Some(head) = self.pending.lock().await.front().cloned() else {
                break;
            };

            let persisted = match step.write(&head).await {
                Ok(()) => {
                    report.written += 1;
                    self.pop_front_and_persist().await
                }
                Err(e) if !e.is_transient() => {
                    tracing::warn!(sheet = %head.sheet_name(), "discarding queued mutation: {}", e);
                    report.discarded.push(head);
                    self.pop_front_and_persist().await
                }
                Err(e) => {
                    tracing::warn!(action = head.action(), "drain stopped: {}", e);
                    report.error = Some(e);
                    break;
                }
            };

            // The mutation has left the in-memory queue either way; the stored
            // copy still lists it until the next successful persist.
            if let Err(e) = persisted {
                tracing::error!("failed to persist offline queue, stopping drain: {}", e);
                report.error = Some(e);
                break;
            }
        }

        report.remaining = self.len().await;
        Ok(report)
    }

    async fn pop_front_and_persist(&self) -> Result<(), SyncError> {
        let mut pending = self.pending.lock().await;
        pending.pop_front();
        self.persist(&pending).await
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Ordered copy of the queue
    pub async fn snapshot(&self) -> Vec<Mutation> {
        self.pending.lock().await.iter().cloned().collect()
    }

    /// Whether a drain is running right now
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionQueue")
            .field("draining", &self.is_draining())
            .finish_non_exhaustive()
    }
}
