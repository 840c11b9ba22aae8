//! S3 Tracker - Sync Core
//!
//! Offline-tolerant, optimistic-update synchronization for a study tracker
//! whose data lives in a remote spreadsheet.
//!
//! # Overview
//!
//! - Every user intent is applied to the local snapshot immediately
//! - Writes that cannot reach the row store are kept in a durable FIFO queue
//! - When connectivity returns the queue drains oldest-first, then a single
//!   full fetch replaces local data with the authoritative layout
//! - Outcomes are published as events; nothing here renders anything
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Rows and snapshots, mutations, events
//!   - Error and configuration types
//!
//! - **`tracker`** - Device-side runtime
//!   - Row store client, persistent store, sync coordinator
//!   - Notes, reminders, progress queries
//!   - Command-line front end
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use s3tracker::tracker::{Config, CoordinatorOptions, HttpRowClient, SqliteStore, SyncCoordinator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let store = Arc::new(SqliteStore::open(&config.database_path()).await?);
//! let remote = Arc::new(HttpRowClient::new(&config)?);
//! let coordinator = SyncCoordinator::new(remote, store, CoordinatorOptions::from_config(&config)).await;
//!
//! coordinator.refresh().await?;
//! coordinator.toggle_item("Daily_Plan", 3, true).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `Result<T, SyncError>` for sync and storage operations
//! - `ConfigError` for configuration
//! - Failed writes are not errors to the caller: they are queued and reported
//!   as `SyncEvent::SavedOffline`

/// Shared types and data structures
pub mod shared;

/// Device-side sync runtime
pub mod tracker;
