//! Study Tracker Sync Module
//!
//! Everything that runs on the device: configuration, local persistence, the
//! row store client and the offline sync core, plus the small read-side
//! helpers the views use.
//!
//! # Architecture
//!
//! - **`config`** - Endpoint, data directory and sync switches
//! - **`local_store`** - Durable key-value storage (SQLite or in-memory)
//! - **`row_client`** - HTTP client for the spreadsheet web app
//! - **`offline`** - Optimistic coordinator, action queue, index re-resolution
//! - **`sync`** - Connectivity signal, sync state machine, metrics
//! - **`state`** - In-memory snapshot and load status
//! - **`notes`** - Local-only per-row notes
//! - **`reminders`** - Hourly check-in switch and scheduler
//! - **`progress`** - Dashboard numbers and tab filters
//! - **`main`** - Command-line front end (binary)
//!
//! # Module Structure
//!
//! ```text
//! tracker/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Command-line entry point
//! ├── config.rs       - Configuration management
//! ├── row_client.rs   - Row store HTTP client
//! ├── state.rs        - Tracker state
//! ├── notes.rs        - Notes
//! ├── reminders.rs    - Hourly reminders
//! ├── progress.rs     - Progress and view queries
//! ├── local_store/    - Persistent store
//! ├── offline/        - Sync core
//! └── sync/           - Connectivity and metrics
//! ```

pub mod config;
pub mod local_store;
pub mod notes;
pub mod offline;
pub mod progress;
pub mod reminders;
pub mod row_client;
pub mod state;
pub mod sync;

// Re-export commonly used types
pub use config::Config;
pub use local_store::{MemoryStore, PersistentStore, SqliteStore};
pub use notes::{NoteBook, NoteKey};
pub use offline::{ApplyOutcome, CoordinatorOptions, SyncCoordinator, SyncReport};
pub use progress::{ProgressSummary, ViewFilter};
pub use reminders::{ReminderScheduler, ReminderSettings};
pub use row_client::{HttpRowClient, RemoteRowStore};
pub use state::{LoadStatus, TrackerState};
