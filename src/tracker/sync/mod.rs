//! # Connectivity and Sync Bookkeeping
//!
//! - **Network Monitor**: publishes the online/offline signal
//! - **Sync State**: the coordinator's connectivity state machine
//! - **Metrics**: counters for direct, queued and drained writes

pub mod metrics;
pub mod network_monitor;
pub mod sync_state;

pub use metrics::SyncMetrics;
pub use network_monitor::{NetworkMonitor, NetworkStatus};
pub use sync_state::{ConnectivityEvent, ConnectivityState, SyncStatus};
