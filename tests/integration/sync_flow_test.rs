//! Sync core end to end against an in-process row store

use crate::common::*;
use crate::{assert_done, assert_ok, assert_pending};
use pretty_assertions::assert_eq;
use s3tracker::shared::{Mutation, NotificationLevel, SyncError, SyncEvent};
use s3tracker::tracker::local_store::QUEUE_KEY;
use s3tracker::tracker::sync::{ConnectivityState, NetworkMonitor, NetworkStatus};
use s3tracker::tracker::{ApplyOutcome, CoordinatorOptions, LoadStatus, RemoteRowStore, SyncCoordinator};
use std::sync::Arc;
use std::time::Duration;

async fn setup() -> (Arc<RecordingRemote>, Arc<SyncCoordinator>) {
    let remote = Arc::new(RecordingRemote::new(tracker_snapshot()));
    let (_, store) = memory_store();
    let coordinator = SyncCoordinator::new(remote.clone(), store, CoordinatorOptions::default()).await;
    (remote, Arc::new(coordinator))
}

#[tokio::test]
async fn test_duplicate_toggle_delivery_is_idempotent() {
    let remote = RecordingRemote::new(tracker_snapshot());
    let toggle = Mutation::toggle("Daily_Plan", 1, true);

    assert_ok!(remote.write_one(&toggle).await);
    assert_ok!(remote.write_one(&toggle).await);

    assert_done!(remote.current(), "Daily_Plan", 1, true);
    assert_eq!(remote.applied().len(), 2);
}

#[tokio::test]
async fn test_drain_is_strictly_fifo() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.set_online(false).await);

    let m1 = Mutation::toggle("Daily_Plan", 0, true);
    let m2 = Mutation::toggle("Daily_Plan", 1, true);
    let m3 = Mutation::toggle("Daily_Plan", 2, false);
    for mutation in [&m1, &m2, &m3] {
        coordinator.apply(mutation.clone(), |_| {}).await;
    }

    remote.reject_row(1);
    let report = assert_ok!(coordinator.set_online(true).await).expect("restore starts a drain");

    assert_eq!(report.drain.written, 1);
    assert_eq!(coordinator.pending().await, vec![m2.clone(), m3.clone()]);
    // m3 never reached the store ahead of m2
    assert_eq!(remote.applied(), vec![m1]);
    assert_eq!(remote.write_attempts(), 2);
    assert_eq!(remote.fetch_count(), 0);
}

#[tokio::test]
async fn test_local_update_visible_before_write_resolves() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.refresh().await);
    assert_done!(coordinator.snapshot(), "Daily_Plan", 0, false);

    let release = remote.hold_next_write();
    let pending_apply = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            coordinator
                .apply(Mutation::toggle("Daily_Plan", 0, true), |snapshot| {
                    snapshot.set_done("Daily_Plan", 0, true);
                })
                .await
        })
    };

    while remote.write_attempts() == 0 {
        tokio::task::yield_now().await;
    }
    assert_done!(coordinator.snapshot(), "Daily_Plan", 0, true);

    remote.set_offline(true);
    release.send(()).unwrap();
    let outcome = pending_apply.await.unwrap();

    // The write failed, the local change stays
    assert_eq!(outcome, ApplyOutcome::Queued { pending: 1 });
    assert_done!(coordinator.snapshot(), "Daily_Plan", 0, true);
}

#[tokio::test]
async fn test_offline_apply_only_enqueues() {
    let remote = Arc::new(RecordingRemote::new(tracker_snapshot()));
    let (memory, store) = memory_store();
    let coordinator = SyncCoordinator::new(remote.clone(), store.clone(), CoordinatorOptions::default()).await;
    assert_ok!(coordinator.set_online(false).await);

    for row in 0..3 {
        let outcome = coordinator
            .apply(Mutation::toggle("Daily_Plan", row, true), |_| {})
            .await;
        assert_eq!(outcome, ApplyOutcome::Queued { pending: row + 1 });
    }

    assert_eq!(remote.write_attempts(), 0);
    assert_pending!(coordinator, 3);
    assert_eq!(store.load(QUEUE_KEY).await.unwrap().map(|queue| queue.len()), Some(3));
    assert!(memory.raw("s3_queue").await.unwrap().starts_with(r#"{"version":1,"data":["#));
    assert_eq!(coordinator.metrics().queued_writes, 3);
}

#[tokio::test]
async fn test_full_drain_issues_exactly_one_fetch() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.set_online(false).await);
    coordinator.apply(Mutation::toggle("Daily_Plan", 0, true), |_| {}).await;
    coordinator.apply(Mutation::toggle("Daily_Plan", 1, true), |_| {}).await;
    coordinator.apply(Mutation::add("Math_Tracker", 2, "Series"), |_| {}).await;

    let report = assert_ok!(coordinator.set_online(true).await).unwrap();
    assert_eq!(report.drain.written, 3);
    assert!(report.reconciled);
    assert_eq!(remote.fetch_count(), 1);

    // Local data now mirrors the store, including the added row
    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.sheet("Math_Tracker").map(<[_]>::len), Some(4));
    assert_done!(snapshot, "Daily_Plan", 1, true);
    assert_eq!(coordinator.load_status(), LoadStatus::Loaded);
}

#[tokio::test]
async fn test_offline_toggle_then_reconnect() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.refresh().await);
    assert_pending!(coordinator, 0);
    let mut events = coordinator.subscribe();

    assert_ok!(coordinator.set_online(false).await);
    assert_eq!(coordinator.connectivity(), ConnectivityState::Offline);

    coordinator
        .apply(Mutation::toggle("Daily_Plan", 3, true), |snapshot| {
            snapshot.set_done("Daily_Plan", 3, true);
        })
        .await;
    assert_done!(coordinator.snapshot(), "Daily_Plan", 3, true);
    assert_pending!(coordinator, 1);
    assert_eq!(remote.write_attempts(), 0);

    let report = assert_ok!(coordinator.set_online(true).await).unwrap();
    assert_eq!(report.drain.written, 1);
    assert_eq!(remote.write_attempts(), 1);
    assert_pending!(coordinator, 0);
    // One fetch to load, exactly one after the drain
    assert_eq!(remote.fetch_count(), 2);
    assert_done!(coordinator.snapshot(), "Daily_Plan", 3, true);
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineIdle);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            SyncEvent::SavedOffline { pending: 1 },
            SyncEvent::SyncStarted { pending: 1 },
            SyncEvent::SyncCompleted,
            SyncEvent::DataRefreshed,
        ]
    );
    let toast = seen[0].notification().unwrap();
    assert_eq!(toast.level, NotificationLevel::Warning);
    assert_eq!(seen[2].notification().unwrap().message, "All changes synced!");
}

#[tokio::test]
async fn test_loaded_item_updates_locally_while_offline() {
    let (_, coordinator) = setup().await;
    assert_ok!(coordinator.refresh().await);
    assert_ok!(coordinator.set_online(false).await);

    let outcome = coordinator.toggle_item("Daily_Plan", 3, true).await;
    assert_eq!(outcome, ApplyOutcome::Queued { pending: 1 });
    assert_done!(coordinator.snapshot(), "Daily_Plan", 3, true);
    assert!(coordinator.pending().await[0].row_key().is_some());
}

#[tokio::test]
async fn test_queued_toggle_follows_row_after_queued_delete() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.refresh().await);
    assert_ok!(coordinator.set_online(false).await);

    // Delete "Limits", then tick "Integrals", which the store will move from 2 to 1
    coordinator.delete_item("Math_Tracker", 0).await;
    coordinator.toggle_item("Math_Tracker", 2, true).await;

    let report = assert_ok!(coordinator.set_online(true).await).unwrap();
    assert!(report.drain.is_complete());

    let current = remote.current();
    let integrals = current
        .sheet("Math_Tracker")
        .unwrap()
        .iter()
        .find(|item| item.text("Topic") == Some("Integrals"))
        .unwrap();
    assert_eq!(integrals.row_index, 1);
    assert!(integrals.done);
    assert_eq!(remote.applied()[1].row_index(), Some(1));
}

#[tokio::test]
async fn test_queued_toggle_for_deleted_row_is_discarded() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.refresh().await);
    assert_ok!(coordinator.set_online(false).await);
    let mut events = coordinator.subscribe();

    let key = coordinator.snapshot().item("Physics_Tracker", 0).unwrap().fingerprint();
    coordinator.toggle_item("Physics_Tracker", 0, false).await;
    coordinator.delete_item("Physics_Tracker", 0).await;
    // Queued against the row the delete removes
    coordinator
        .apply(Mutation::toggle("Physics_Tracker", 0, true).with_row_key(key), |_| {})
        .await;

    let report = assert_ok!(coordinator.set_online(true).await).unwrap();
    assert_eq!(report.drain.written, 2);
    assert_eq!(report.drain.discarded.len(), 1);
    assert!(report.drain.is_complete());
    assert_eq!(remote.current().sheet("Physics_Tracker").map(<[_]>::len), Some(0));

    let mut discarded = false;
    while let Ok(event) = events.try_recv() {
        discarded |= matches!(event, SyncEvent::MutationDiscarded { .. });
    }
    assert!(discarded);
}

#[tokio::test]
async fn test_failed_online_write_does_not_go_offline() {
    let (remote, coordinator) = setup().await;
    remote.set_offline(true);

    let outcome = coordinator.add_item("Math_Tracker", 3, "Vectors").await;
    assert_eq!(outcome, ApplyOutcome::Queued { pending: 1 });
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineIdle);
    assert_eq!(remote.fetch_count(), 0);

    // A manual sync retries the queue once the store is reachable
    remote.set_offline(false);
    let report = assert_ok!(coordinator.sync_pending().await);
    assert!(report.drain.is_complete());
    assert_eq!(remote.fetch_count(), 1);
}

#[tokio::test]
async fn test_stalled_drain_retries_on_next_reconnect() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.set_online(false).await);
    coordinator.apply(Mutation::toggle("Daily_Plan", 4, true), |_| {}).await;

    remote.set_offline(true);
    let first = assert_ok!(coordinator.set_online(true).await).unwrap();
    assert_eq!(first.drain.remaining, 1);
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineIdle);

    remote.set_offline(false);
    assert_ok!(coordinator.set_online(false).await);
    let second = assert_ok!(coordinator.set_online(true).await).unwrap();
    assert!(second.drain.is_complete());
    assert_eq!(remote.fetch_count(), 1);
    assert_eq!(coordinator.metrics().total_syncs, 2);
}

#[tokio::test]
async fn test_local_storage_failure_during_drain_stalls_sync() {
    let remote = Arc::new(RecordingRemote::new(tracker_snapshot()));
    let (memory, store) = memory_store();
    let coordinator =
        SyncCoordinator::new(remote.clone(), store.clone(), CoordinatorOptions::default()).await;

    assert_ok!(coordinator.set_online(false).await);
    coordinator.apply(Mutation::toggle("Daily_Plan", 0, true), |_| {}).await;
    coordinator.apply(Mutation::toggle("Daily_Plan", 1, true), |_| {}).await;
    let mut events = coordinator.subscribe();

    memory.set_fail_writes(true);
    let report = assert_ok!(coordinator.set_online(true).await).expect("restore starts a drain");

    assert_eq!(report.drain.written, 1);
    assert_eq!(report.drain.remaining, 1);
    assert!(matches!(report.drain.error, Some(SyncError::StorageError { .. })));
    assert!(!report.reconciled);
    assert_eq!(remote.applied().len(), 1);
    assert_pending!(coordinator, 1);
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineIdle);
    assert_eq!(remote.fetch_count(), 0);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], SyncEvent::SyncStarted { pending: 2 });
    assert!(matches!(seen[1], SyncEvent::SyncStalled { remaining: 1, .. }));

    let metrics = coordinator.metrics();
    assert_eq!(metrics.total_syncs, 1);
    assert_eq!(metrics.stalled_syncs, 1);
    assert_eq!(metrics.successful_syncs, 0);

    // Once storage recovers the rest drains and the stored queue catches up
    memory.set_fail_writes(false);
    let report = assert_ok!(coordinator.sync_pending().await);
    assert!(report.drain.is_complete());
    assert_eq!(remote.applied().len(), 2);
    assert_eq!(store.load(QUEUE_KEY).await.unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn test_second_sync_during_drain_is_refused() {
    let (remote, coordinator) = setup().await;
    assert_ok!(coordinator.set_online(false).await);
    coordinator.apply(Mutation::toggle("Daily_Plan", 0, true), |_| {}).await;
    coordinator.apply(Mutation::toggle("Daily_Plan", 1, true), |_| {}).await;
    let mut events = coordinator.subscribe();

    let release = remote.hold_next_write();
    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.set_online(true).await })
    };
    while remote.write_attempts() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineSyncing);

    assert!(matches!(coordinator.sync_pending().await, Err(SyncError::DrainInProgress)));

    // Connectivity flapping mid-drain does not start another drain
    assert_ok!(coordinator.set_online(false).await);
    assert!(matches!(coordinator.set_online(true).await, Err(SyncError::DrainInProgress)));
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineSyncing);
    assert_eq!(remote.write_attempts(), 1);

    release.send(()).unwrap();
    let report = assert_ok!(first.await.unwrap()).expect("restore starts a drain");
    assert!(report.drain.is_complete());
    assert_eq!(report.drain.written, 2);
    assert_eq!(remote.write_attempts(), 2);
    assert_eq!(remote.fetch_count(), 1);
    assert_eq!(coordinator.connectivity(), ConnectivityState::OnlineIdle);

    let mut started = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SyncEvent::SyncStarted { .. }) {
            started += 1;
        }
    }
    assert_eq!(started, 1);
}

#[tokio::test]
async fn test_connectivity_listener_drives_sync() {
    let (remote, coordinator) = setup().await;
    let monitor = NetworkMonitor::new(NetworkStatus::Online);
    let listener = coordinator.spawn_connectivity_listener(monitor.subscribe());

    monitor.set_status(NetworkStatus::Offline);
    tokio::time::timeout(Duration::from_secs(5), async {
        while coordinator.connectivity() != ConnectivityState::Offline {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("listener saw connectivity loss");

    coordinator.apply(Mutation::toggle("Daily_Plan", 2, true), |_| {}).await;
    monitor.set_status(NetworkStatus::Online);

    tokio::time::timeout(Duration::from_secs(5), async {
        while remote.fetch_count() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("listener drained the queue");
    assert_pending!(coordinator, 0);

    drop(monitor);
    listener.await.unwrap();
}
