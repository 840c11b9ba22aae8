//! Property-based tests for queue drain ordering

use super::persistence_proptest::arb_mutation;
use async_trait::async_trait;
use proptest::prelude::*;
use s3tracker::shared::{Mutation, SyncError};
use s3tracker::tracker::local_store::{MemoryStore, PersistentStore};
use s3tracker::tracker::offline::{ActionQueue, DrainStep};
use std::sync::Arc;

/// Accepts the first `accept` writes, then fails
struct FailAfter {
    accept: usize,
    delivered: Vec<Mutation>,
}

#[async_trait]
impl DrainStep for FailAfter {
    async fn write(&mut self, mutation: &Mutation) -> Result<(), SyncError> {
        if self.delivered.len() == self.accept {
            return Err(SyncError::network("unreachable"));
        }
        self.delivered.push(mutation.clone());
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_drain_delivers_prefix_and_keeps_suffix(
        queue in proptest::collection::vec(arb_mutation(), 0..16),
        accept in 0usize..20,
    ) {
        let (delivered, remaining, persisted) = tokio_test::block_on(async {
            let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
            let actions = ActionQueue::load(store.clone()).await;
            for mutation in &queue {
                actions.enqueue(mutation.clone()).await;
            }

            let mut step = FailAfter { accept, delivered: Vec::new() };
            actions.drain(&mut step).await.unwrap();

            let reloaded = ActionQueue::load(store).await;
            (step.delivered, actions.snapshot().await, reloaded.snapshot().await)
        });

        let split = accept.min(queue.len());
        prop_assert_eq!(&delivered[..], &queue[..split]);
        prop_assert_eq!(&remaining[..], &queue[split..]);
        prop_assert_eq!(persisted, remaining);
    }
}
