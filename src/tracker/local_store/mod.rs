//! # Local Persistent Store
//!
//! Durable key-value storage for everything the tracker keeps on this device:
//! the pending action queue, notes and the reminder flag.
//!
//! ## Architecture
//!
//! - [`PersistentStore`] is the raw string key-value contract. It is injected
//!   into the queue, the note book and the reminder settings.
//! - [`StoreKey`] pairs a key name with the type stored under it, so reads and
//!   writes are typed at the call site.
//! - Values are written inside a versioned envelope
//!   (`{"version": 1, "data": ...}`); bare values from before the envelope
//!   existed are still readable.
//!
//! ## Key Components
//!
//! - `MemoryStore`: process-local store for tests and ephemeral sessions
//! - `sqlite.rs`: SQLite-backed store used by the binary
//! - `schema.rs`: SQLite schema version bookkeeping
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use s3tracker::tracker::local_store::{MemoryStore, PersistentStore, REMINDERS_KEY};
//!
//! # async fn example() -> Result<(), s3tracker::shared::SyncError> {
//! let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
//! store.save(REMINDERS_KEY, &true).await?;
//! assert_eq!(store.load(REMINDERS_KEY).await?, Some(true));
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::shared::error::SyncError;
use crate::shared::mutation::Mutation;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Version written into every envelope
pub const STORE_FORMAT_VERSION: u64 = 1;

/// Pending action queue
pub const QUEUE_KEY: StoreKey<Vec<Mutation>> = StoreKey::new("s3_queue");

/// Notes keyed by `"{sheet}-{row}"`
pub const NOTES_KEY: StoreKey<BTreeMap<String, String>> = StoreKey::new("s3_notes");

/// Hourly reminder switch
pub const REMINDERS_KEY: StoreKey<bool> = StoreKey::new("s3_reminders");

/// Raw durable key-value storage.
///
/// A completed `put` must be durable before it returns.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SyncError>;
    async fn put(&self, key: &str, value: String) -> Result<(), SyncError>;
    async fn remove(&self, key: &str) -> Result<(), SyncError>;
}

/// A key name bound to the type stored under it
#[derive(Debug)]
pub struct StoreKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StoreKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for StoreKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StoreKey<T> {}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u64,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    version: u64,
    data: Value,
}

/// Serialize a value inside the current envelope
pub fn encode<T: Serialize>(value: &T) -> Result<String, SyncError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: STORE_FORMAT_VERSION,
        data: value,
    })?)
}

/// Deserialize an envelope, or a bare legacy value
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, SyncError> {
    let value: Value = serde_json::from_str(raw)?;
    let data = match serde_json::from_value::<Envelope>(value.clone()) {
        Ok(envelope) if envelope.version > STORE_FORMAT_VERSION => {
            return Err(SyncError::serialization(format!(
                "stored data has format version {}, newest supported is {}",
                envelope.version, STORE_FORMAT_VERSION
            )));
        }
        Ok(envelope) => envelope.data,
        Err(_) => value,
    };
    Ok(serde_json::from_value(data)?)
}

impl dyn PersistentStore {
    /// Read a typed value
    pub async fn load<T: DeserializeOwned>(&self, key: StoreKey<T>) -> Result<Option<T>, SyncError> {
        match self.get(key.name()).await? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Read a typed value, falling back to the default when it is missing or unreadable
    pub async fn load_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey<T>) -> T {
        match self.load(key).await {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key = key.name(), "discarding unreadable stored value: {}", e);
                T::default()
            }
        }
    }

    /// Write a typed value
    pub async fn save<T: Serialize>(&self, key: StoreKey<T>, value: &T) -> Result<(), SyncError> {
        let raw = encode(value)?;
        self.put(key.name(), raw).await
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (for exercising persistence failures)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored string for a key
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SyncError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), SyncError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::storage("memory store is refusing writes"));
        }
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SyncError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
