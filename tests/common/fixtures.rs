//! Sheet payload fixtures

use s3tracker::shared::SheetSnapshot;
use s3tracker::tracker::{MemoryStore, PersistentStore};
use serde_json::{json, Value};
use std::sync::Arc;

/// Read-all payload with a five-day plan and two subject trackers
pub fn tracker_payload() -> Value {
    json!({
        "Daily_Plan": [
            ["Date", "Subject", "Module(s) Focus", "Done"],
            ["2024-03-01", "Calculus", "M1", false],
            ["2024-03-02", "Physics", "M1", false],
            ["2024-03-03", "Calculus", "M2", true],
            ["2024-03-04", "Chemistry", "M1", false],
            ["2024-03-05", "Physics", "M2", false]
        ],
        "Math_Tracker": [
            ["Module", "Topic", "Done"],
            [1, "Limits", true],
            [1, "Derivatives", false],
            [2, "Integrals", false]
        ],
        "Physics_Tracker": [
            ["Module", "Topic", "Done"],
            [1, "Kinematics", true]
        ]
    })
}

pub fn tracker_snapshot() -> SheetSnapshot {
    SheetSnapshot::from_json(&tracker_payload()).expect("fixture payload parses")
}

/// In-memory store, both as its concrete type and as the injected trait object
pub fn memory_store() -> (Arc<MemoryStore>, Arc<dyn PersistentStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn PersistentStore> = memory.clone();
    (memory, store)
}
