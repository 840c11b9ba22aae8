//! # Row Index Re-resolution
//!
//! A queued mutation addresses its row by position, and positions shift when an
//! add or delete lands on the same sheet first. Mutations created through the
//! coordinator also carry the row's content fingerprint (`row_key`), which lets
//! a drain find the row again against the remote's current layout.
//!
//! ## Strategy
//!
//! - Before the first keyed mutation of a drain, fetch a snapshot.
//! - Keep the recorded index if the row there still has the fingerprint.
//! - Otherwise move to the row with that fingerprint nearest the recorded index.
//! - No row with that fingerprint: the mutation fails with `StaleIndex` and the
//!   queue discards it.
//! - After a structural mutation (add/delete) is written, drop the snapshot so
//!   the next keyed mutation sees the shifted layout.
//!
//! Mutations without a fingerprint are written exactly as queued.

use crate::shared::error::SyncError;
use crate::shared::mutation::Mutation;
use crate::shared::sheet::SheetSnapshot;
use crate::tracker::offline::queue::DrainStep;
use crate::tracker::row_client::RemoteRowStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Point a keyed mutation at its row in `snapshot`
pub fn resolve_row_index(snapshot: &SheetSnapshot, mutation: &Mutation) -> Result<Mutation, SyncError> {
    let (Some(row_index), Some(key)) = (mutation.row_index(), mutation.row_key()) else {
        return Ok(mutation.clone());
    };
    let sheet_name = mutation.sheet_name();
    let rows = snapshot
        .sheet(sheet_name)
        .ok_or_else(|| SyncError::stale_index(sheet_name, row_index))?;

    if rows
        .iter()
        .any(|item| item.row_index == row_index && item.fingerprint() == key)
    {
        return Ok(mutation.clone());
    }

    let nearest = rows
        .iter()
        .filter(|item| item.fingerprint() == key)
        .min_by_key(|item| item.row_index.abs_diff(row_index));

    match nearest {
        Some(item) => {
            tracing::info!(
                sheet = %sheet_name,
                from = row_index,
                to = item.row_index,
                "re-resolved queued row index"
            );
            Ok(mutation.with_row_index(item.row_index))
        }
        None => Err(SyncError::stale_index(sheet_name, row_index)),
    }
}

/// Drain step that re-resolves row indices before writing
pub struct IndexResolver {
    remote: Arc<dyn RemoteRowStore>,
    enabled: bool,
    snapshot: Option<SheetSnapshot>,
    fetches: usize,
}

impl IndexResolver {
    pub fn new(remote: Arc<dyn RemoteRowStore>, enabled: bool) -> Self {
        Self {
            remote,
            enabled,
            snapshot: None,
            fetches: 0,
        }
    }

    /// Snapshots fetched for resolution so far
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

#[async_trait]
impl DrainStep for IndexResolver {
    async fn write(&mut self, mutation: &Mutation) -> Result<(), SyncError> {
        let target = if self.enabled && mutation.row_key().is_some() {
            let snapshot = match self.snapshot.take() {
                Some(snapshot) => snapshot,
                None => {
                    self.fetches += 1;
                    self.remote.fetch_all().await?
                }
            };
            let resolved = resolve_row_index(&snapshot, mutation);
            self.snapshot = Some(snapshot);
            resolved?
        } else {
            mutation.clone()
        };

        self.remote.write_one(&target).await?;

        if target.is_structural() {
            self.snapshot = None;
        }
        Ok(())
    }
}
