//! # Hourly Reminders
//!
//! A persisted on/off switch plus a scheduler that decides when the next
//! study check-in is due. Delivering the check-in is up to the front end.
//!
//! ## Features
//!
//! - **Persistent Switch**: stored under `s3_reminders`, survives restarts
//! - **Fixed Interval**: one check-in per hour while enabled
//! - **Message Rotation**: cycles through the check-in messages in order

use crate::shared::error::SyncError;
use crate::shared::event::SyncEvent;
use crate::tracker::local_store::{PersistentStore, REMINDERS_KEY};
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Check-in messages, shown in this order
pub const CHECK_IN_MESSAGES: [&str; 4] = [
    "Time to lock in! 📚",
    "Keep the momentum going!",
    "One hour down. How's the progress?",
    "Don't break the streak! Focus time.",
];

/// Persisted reminder switch
pub struct ReminderSettings {
    store: Arc<dyn PersistentStore>,
    enabled: AtomicBool,
    events: Option<broadcast::Sender<SyncEvent>>,
}

impl ReminderSettings {
    /// Load the switch; missing or unreadable means off
    pub async fn load(store: Arc<dyn PersistentStore>) -> Self {
        let enabled = store.load_or_default(REMINDERS_KEY).await;
        Self {
            store,
            enabled: AtomicBool::new(enabled),
            events: None,
        }
    }

    /// Report changes on an event channel
    pub fn with_events(mut self, events: broadcast::Sender<SyncEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), SyncError> {
        self.store.save(REMINDERS_KEY, &enabled).await?;
        self.enabled.store(enabled, Ordering::SeqCst);

        tracing::info!(enabled, "hourly reminders switched");
        if let Some(events) = &self.events {
            let _ = events.send(SyncEvent::RemindersToggled { enabled });
        }
        Ok(())
    }

    /// Flip the switch; returns the new value
    pub async fn toggle(&self) -> Result<bool, SyncError> {
        let enabled = !self.enabled();
        self.set_enabled(enabled).await?;
        Ok(enabled)
    }
}

impl std::fmt::Debug for ReminderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderSettings")
            .field("enabled", &self.enabled())
            .finish_non_exhaustive()
    }
}

/// Decides when the next check-in is due
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    /// Time between check-ins
    interval: Duration,
    /// When the interval started counting
    last_reminded: DateTime<Utc>,
    /// Index of the next message
    next_message: usize,
}

impl ReminderScheduler {
    /// Start counting from `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            interval: Duration::hours(1),
            last_reminded: now,
            next_message: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if a check-in is due at `now`
    pub fn should_remind(&self, now: DateTime<Utc>) -> bool {
        now - self.last_reminded >= self.interval
    }

    /// Record a delivered check-in
    pub fn mark_reminded(&mut self, now: DateTime<Utc>) {
        self.last_reminded = now;
    }

    /// Time left until the next check-in
    pub fn time_until_next(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = now - self.last_reminded;
        if elapsed >= self.interval {
            Duration::zero()
        } else {
            self.interval - elapsed
        }
    }

    /// Next check-in message
    pub fn next_message(&mut self) -> &'static str {
        let message = CHECK_IN_MESSAGES[self.next_message % CHECK_IN_MESSAGES.len()];
        self.next_message = (self.next_message + 1) % CHECK_IN_MESSAGES.len();
        message
    }
}
