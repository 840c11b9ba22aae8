//! # Sync Metrics
//!
//! Counters describing how writes reached (or did not reach) the row store.

use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncMetrics {
    /// Writes that succeeded on the first, online attempt
    pub direct_writes: u64,
    /// Writes deferred to the queue
    pub queued_writes: u64,
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub stalled_syncs: u64,
    pub drained_mutations: u64,
    pub discarded_mutations: u64,
    pub refetches: u64,
    pub last_sync_duration: Option<Duration>,
    #[serde(skip)]
    last_sync_start: Option<Instant>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_direct_write(&mut self) {
        self.direct_writes += 1;
    }

    pub fn record_queued_write(&mut self) {
        self.queued_writes += 1;
    }

    pub fn record_refetch(&mut self) {
        self.refetches += 1;
    }

    pub fn record_sync_start(&mut self) {
        self.last_sync_start = Some(Instant::now());
        self.total_syncs += 1;
    }

    fn finish_sync(&mut self, drained: usize, discarded: usize) {
        if let Some(start) = self.last_sync_start.take() {
            self.last_sync_duration = Some(start.elapsed());
        }
        self.drained_mutations += drained as u64;
        self.discarded_mutations += discarded as u64;
    }

    pub fn record_sync_success(&mut self, drained: usize, discarded: usize) {
        self.finish_sync(drained, discarded);
        self.successful_syncs += 1;
    }

    pub fn record_sync_stalled(&mut self, drained: usize, discarded: usize) {
        self.finish_sync(drained, discarded);
        self.stalled_syncs += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_syncs == 0 {
            0.0
        } else {
            self.successful_syncs as f64 / self.total_syncs as f64
        }
    }
}
