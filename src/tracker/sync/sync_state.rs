//! # Sync State Management
//!
//! Connectivity-driven state machine of the coordinator.
//!
//! ```text
//! ONLINE_IDLE    --(connectivity lost)-------------------> OFFLINE
//! OFFLINE        --(restored, queue empty)---------------> ONLINE_IDLE
//! OFFLINE        --(restored, queue non-empty)-----------> ONLINE_SYNCING
//! ONLINE_SYNCING --(drain finished, empty or not)--------> ONLINE_IDLE
//! ONLINE_SYNCING --(connectivity lost)-------------------> OFFLINE
//! ```
//!
//! A failed write never changes state; only the connectivity signal moves the
//! machine into `Offline`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    OnlineIdle,
    OnlineSyncing,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    ConnectivityLost,
    ConnectivityRestored { queue_empty: bool },
    DrainFinished,
    WriteFailed,
}

impl ConnectivityState {
    pub fn is_online(self) -> bool {
        self != ConnectivityState::Offline
    }

    pub fn transition(self, event: ConnectivityEvent) -> Self {
        use ConnectivityEvent::*;
        use ConnectivityState::*;
        match (self, event) {
            (OnlineIdle | OnlineSyncing, ConnectivityLost) => Offline,
            (Offline, ConnectivityRestored { queue_empty: true }) => OnlineIdle,
            (Offline, ConnectivityRestored { queue_empty: false }) => OnlineSyncing,
            (OnlineSyncing, DrainFinished) => OnlineIdle,
            (state, _) => state,
        }
    }
}

/// Point-in-time view of the sync core for status displays
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub state: ConnectivityState,
    pub pending_operations: usize,
    /// RFC3339 time of the last complete drain
    pub last_sync: Option<String>,
    pub last_error: Option<String>,
}
