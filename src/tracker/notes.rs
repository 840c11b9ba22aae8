//! # Notes
//!
//! Free-text annotations attached to a row, stored on this device only and
//! never sent to the row store. A note is not checked against the row it
//! names, so deleting the row leaves the note behind.

use crate::shared::error::SyncError;
use crate::shared::event::SyncEvent;
use crate::tracker::local_store::{PersistentStore, NOTES_KEY};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Row a note is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteKey {
    pub sheet_name: String,
    pub row_index: usize,
}

impl NoteKey {
    pub fn new(sheet_name: impl Into<String>, row_index: usize) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            row_index,
        }
    }
}

/// Renders the stored key, `"{sheet}-{row}"`
impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sheet_name, self.row_index)
    }
}

/// Locally persisted note collection
pub struct NoteBook {
    store: Arc<dyn PersistentStore>,
    notes: RwLock<BTreeMap<String, String>>,
    events: Option<broadcast::Sender<SyncEvent>>,
}

impl NoteBook {
    /// Load notes; unreadable data starts an empty book
    pub async fn load(store: Arc<dyn PersistentStore>) -> Self {
        let notes = store.load_or_default(NOTES_KEY).await;
        Self {
            store,
            notes: RwLock::new(notes),
            events: None,
        }
    }

    /// Report saves on an event channel
    pub fn with_events(mut self, events: broadcast::Sender<SyncEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub async fn get(&self, key: &NoteKey) -> Option<String> {
        self.notes.read().await.get(&key.to_string()).cloned()
    }

    /// Store a note and persist the whole collection
    pub async fn save(&self, key: &NoteKey, text: impl Into<String>) -> Result<(), SyncError> {
        let rendered = key.to_string();
        let mut notes = self.notes.write().await;
        notes.insert(rendered.clone(), text.into());
        self.store.save(NOTES_KEY, &*notes).await?;
        drop(notes);

        tracing::debug!(key = %rendered, "note saved");
        if let Some(events) = &self.events {
            let _ = events.send(SyncEvent::NoteSaved { key: rendered });
        }
        Ok(())
    }

    /// Every note by stored key
    pub async fn all(&self) -> BTreeMap<String, String> {
        self.notes.read().await.clone()
    }
}

impl fmt::Debug for NoteBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteBook").finish_non_exhaustive()
    }
}
