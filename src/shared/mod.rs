//! Shared Module
//!
//! This module contains the data types shared by every part of the tracker:
//! the row snapshot read from the spreadsheet store, the mutations written
//! back to it, the events the sync core emits, configuration and errors.
//!
//! # Overview
//!
//! Nothing in here performs I/O. All types are designed for serialization,
//! either over HTTP to the row store or into the local persistent store.

/// Sheet rows and snapshots
pub mod sheet;

/// Pending write intents
pub mod mutation;

/// Sync event system
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use sheet::{Item, SheetSnapshot};
pub use mutation::Mutation;
pub use event::{Notification, NotificationLevel, SyncEvent};
pub use error::SyncError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
