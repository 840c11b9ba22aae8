/**
 * Sync Event System
 *
 * Events the sync core emits while it works. The core only decides *what*
 * happened; turning an event into something a user sees is left to whoever
 * subscribes. `SyncEvent::notification` gives the default transient message
 * for each event.
 */
use serde::{Deserialize, Serialize};

/// Something the sync core did that a front end may want to surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A mutation could not be written and was queued
    SavedOffline {
        /// Queue length after the enqueue
        pending: usize,
    },
    /// A drain is starting
    SyncStarted { pending: usize },
    /// The queue drained completely
    SyncCompleted,
    /// A drain stopped at a failing mutation
    SyncStalled { remaining: usize, reason: String },
    /// A queued mutation pointed at a row that no longer exists and was dropped
    MutationDiscarded { sheet_name: String, row_index: usize },
    /// A full fetch replaced local data
    DataRefreshed,
    /// A full fetch failed
    LoadFailed { message: String },
    /// A note was persisted locally
    NoteSaved { key: String },
    /// Hourly reminders were switched
    RemindersToggled { enabled: bool },
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Presentation-free transient message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// RFC3339 time the notification was produced
    pub timestamp: String,
}

impl SyncEvent {
    /// Default user-facing notification for this event.
    ///
    /// A stalled sync has none; it is only logged.
    pub fn notification(&self) -> Option<Notification> {
        let (level, message) = match self {
            SyncEvent::SavedOffline { .. } => {
                (NotificationLevel::Warning, "Saved offline. Syncing later.".to_string())
            }
            SyncEvent::SyncStarted { pending } => {
                (NotificationLevel::Info, format!("Syncing {} changes...", pending))
            }
            SyncEvent::SyncCompleted => (NotificationLevel::Success, "All changes synced!".to_string()),
            SyncEvent::SyncStalled { .. } => return None,
            SyncEvent::MutationDiscarded { sheet_name, .. } => (
                NotificationLevel::Warning,
                format!("Dropped an offline change to {}: row no longer exists", sheet_name),
            ),
            SyncEvent::DataRefreshed => return None,
            SyncEvent::LoadFailed { message } => (NotificationLevel::Error, message.clone()),
            SyncEvent::NoteSaved { .. } => (NotificationLevel::Success, "Note saved locally".to_string()),
            SyncEvent::RemindersToggled { enabled } => {
                let state = if *enabled { "ON" } else { "OFF" };
                let level = if *enabled { NotificationLevel::Success } else { NotificationLevel::Info };
                (level, format!("Hourly reminders {}", state))
            }
        };
        Some(Notification {
            level,
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}
