//! SQLite-backed persistence across reopen

use crate::assert_ok;
use s3tracker::shared::Mutation;
use s3tracker::tracker::local_store::{PersistentStore, NOTES_KEY, QUEUE_KEY};
use s3tracker::tracker::offline::ActionQueue;
use s3tracker::tracker::{NoteBook, NoteKey, SqliteStore};
use std::sync::Arc;

#[tokio::test]
async fn test_queue_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");

    {
        let store = Arc::new(assert_ok!(SqliteStore::open(&path).await));
        let queue = ActionQueue::load(store.clone()).await;
        queue.enqueue(Mutation::toggle("Daily_Plan", 3, true)).await;
        queue.enqueue(Mutation::add("Math_Tracker", 2, "Series")).await;
        queue.enqueue(Mutation::delete("Math_Tracker", 0)).await;
        store.close().await;
    }

    let store = Arc::new(assert_ok!(SqliteStore::open(&path).await));
    let queue = ActionQueue::load(store.clone()).await;
    assert_eq!(
        queue.snapshot().await,
        vec![
            Mutation::toggle("Daily_Plan", 3, true),
            Mutation::add("Math_Tracker", 2, "Series"),
            Mutation::delete("Math_Tracker", 0),
        ]
    );

    let store: Arc<dyn PersistentStore> = store;
    assert_eq!(store.load(QUEUE_KEY).await.unwrap().map(|q| q.len()), Some(3));
}

#[tokio::test]
async fn test_notes_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.db");

    {
        let store = Arc::new(SqliteStore::open(&path).await.unwrap());
        let notes = NoteBook::load(store.clone()).await;
        notes.save(&NoteKey::new("Daily_Plan", 1), "past paper 2019").await.unwrap();
        store.close().await;
    }

    let store: Arc<dyn PersistentStore> = Arc::new(SqliteStore::open(&path).await.unwrap());
    let notes = store.load(NOTES_KEY).await.unwrap().unwrap();
    assert_eq!(notes.get("Daily_Plan-1").map(String::as_str), Some("past paper 2019"));
}
