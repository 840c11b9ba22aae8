//! Shared Error Types
//!
//! This module defines the error type used across the sync core: the remote
//! row-store client, the local persistent store, the action queue and the
//! coordinator all report failures through [`SyncError`].
//!
//! # Error Categories
//!
//! - `NetworkError` - transport or HTTP failure talking to the row store
//! - `ParseError` - the row store answered with something that is not a snapshot
//! - `Rejected` - the row store answered a write with a non-"success" status
//! - `StaleIndex` - a queued mutation no longer points at its original row
//! - `StorageError` / `SerializationError` - local persistence failures
//! - `DrainInProgress` - a second drain was requested while one is running
//! - `NotConfigured` - no endpoint URL is configured
//!
//! # Usage
//!
//! ```rust
//! use s3tracker::shared::error::SyncError;
//!
//! let error = SyncError::network("connection reset");
//! assert!(error.is_transient());
//! ```
use thiserror::Error;

/// Errors raised by the sync core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failure or non-success HTTP status
    #[error("Network error: {message}")]
    NetworkError {
        /// Human-readable error message
        message: String,
    },

    /// Malformed remote response
    #[error("Parse error: {message}")]
    ParseError {
        /// Human-readable error message
        message: String,
    },

    /// The remote answered a write with a status other than "success"
    #[error("Write rejected by row store (status: {status})")]
    Rejected {
        /// Status string returned by the remote
        status: String,
    },

    /// A queued mutation's row index no longer matches the remote layout
    #[error("Stale row index {row_index} in sheet '{sheet_name}'")]
    StaleIndex {
        /// Sheet the mutation targets
        sheet_name: String,
        /// Row index recorded at enqueue time
        row_index: usize,
    },

    /// Local durable storage failure
    #[error("Storage error: {message}")]
    StorageError {
        /// Human-readable error message
        message: String,
    },

    /// JSON encoding or decoding of local data failed
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// A drain is already running
    #[error("A queue drain is already in progress")]
    DrainInProgress,

    /// No remote endpoint configured
    #[error("Row store endpoint is not configured")]
    NotConfigured,
}

impl SyncError {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new stale index error
    pub fn stale_index(sheet_name: impl Into<String>, row_index: usize) -> Self {
        Self::StaleIndex {
            sheet_name: sheet_name.into(),
            row_index,
        }
    }

    /// Whether a mutation that hit this error should stay queued.
    ///
    /// Only a stale index is permanent: retrying it would write to the wrong row.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::StaleIndex { .. })
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        Self::storage(err.to_string())
    }
}
