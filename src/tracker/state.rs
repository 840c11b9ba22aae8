//! In-memory tracker state shared by every view.

use crate::shared::sheet::SheetSnapshot;
use serde::Serialize;

/// Outcome of the most recent full fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    Loaded,
    /// The fetch failed; views block behind a retry affordance
    Error(String),
}

/// Central application state: the row snapshot views render from
#[derive(Debug, Clone)]
pub struct TrackerState {
    /// Rows as last fetched, plus any optimistic edits since
    pub snapshot: SheetSnapshot,
    pub load_status: LoadStatus,
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            snapshot: SheetSnapshot::default(),
            load_status: LoadStatus::Loading,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.load_status == LoadStatus::Loaded
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}
