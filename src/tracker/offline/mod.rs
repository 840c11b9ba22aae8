//! # Offline Sync Core
//!
//! Offline-tolerant writes against the row store: optimistic local updates,
//! a durable FIFO of undelivered mutations, and a drain that reconciles with
//! a full fetch once everything has landed.
//!
//! ## Architecture
//!
//! - **Optimistic Coordinator**: applies intents locally, writes or queues them
//! - **Action Queue**: persisted, strictly ordered, single-flight drain
//! - **Reconciliation**: re-resolves queued row indices against the remote
//!   layout before each keyed write
//!
//! ## Key Components
//!
//! - `optimistic.rs`: [`SyncCoordinator`] and the connectivity state machine driver
//! - `queue.rs`: [`ActionQueue`] and the [`DrainStep`] seam
//! - `reconciliation.rs`: [`IndexResolver`] drain step
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use s3tracker::tracker::offline::{CoordinatorOptions, SyncCoordinator};
//!
//! # async fn example(
//! #     remote: Arc<dyn s3tracker::tracker::row_client::RemoteRowStore>,
//! #     store: Arc<dyn s3tracker::tracker::local_store::PersistentStore>,
//! # ) -> Result<(), s3tracker::shared::SyncError> {
//! let coordinator = SyncCoordinator::new(remote, store, CoordinatorOptions::default()).await;
//!
//! // Queued while offline
//! coordinator.set_online(false).await?;
//! coordinator.toggle_item("Daily_Plan", 3, true).await;
//!
//! // Drained, then refetched
//! coordinator.set_online(true).await?;
//! # Ok(())
//! # }
//! ```

pub mod optimistic;
pub mod queue;
pub mod reconciliation;

// Re-export main types
pub use optimistic::{ApplyOutcome, CoordinatorOptions, SyncCoordinator, SyncReport};
pub use queue::{ActionQueue, DrainReport, DrainStep};
pub use reconciliation::{resolve_row_index, IndexResolver};
