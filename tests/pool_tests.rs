//! The matchmaking pool as seen through `QueueService`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use shared::{
    models::client::ClientProfile,
    services::{errors::queue_service_errors::QueueServiceError, queue_service::QueueService},
    time_source::{ManualTimeSource, TimeSource},
};

fn queue() -> (QueueService, Arc<ManualTimeSource>) {
    let clock = Arc::new(ManualTimeSource::new(Utc::now()));
    (QueueService::new(clock.clone()), clock)
}

#[tokio::test]
async fn test_join_order_and_wait_times() {
    let (queue, clock) = queue();

    queue.add_client(ClientProfile::new("a", 1200)).await.unwrap();
    clock.advance(Duration::seconds(30));
    queue.add_client(ClientProfile::new("b", 1300)).await.unwrap();
    clock.advance(Duration::seconds(10));

    let snapshot = queue.snapshot().await;
    let now = clock.now();

    assert_eq!(snapshot[0].client_key(), "a");
    assert_eq!(snapshot[0].wait_seconds(now), 40.0);
    assert_eq!(snapshot[1].client_key(), "b");
    assert_eq!(snapshot[1].wait_seconds(now), 10.0);
}

#[tokio::test]
async fn test_double_join_and_unknown_leave() {
    let (queue, _) = queue();

    queue.add_client(ClientProfile::new("a", 1200)).await.unwrap();

    assert_eq!(
        queue.add_client(ClientProfile::new("a", 1500)).await,
        Err(QueueServiceError::AlreadyQueued)
    );
    assert_eq!(
        queue.remove_client("ghost").await.unwrap_err(),
        QueueServiceError::NotQueued
    );
    assert_eq!(queue.len().await, 1);
    assert_eq!(queue.snapshot().await[0].profile.elo, 1200);
}

#[tokio::test]
async fn test_requeue_keeps_accumulated_wait() {
    let (queue, clock) = queue();
    queue.add_client(ClientProfile::new("a", 1200)).await.unwrap();
    clock.advance(Duration::seconds(10));
    queue.add_client(ClientProfile::new("b", 1200)).await.unwrap();
    clock.advance(Duration::seconds(80));

    let removed = queue.remove_client("a").await.unwrap();
    queue.add_client(ClientProfile::new("c", 1200)).await.unwrap();
    queue.requeue(removed).await.unwrap();

    let snapshot = queue.snapshot().await;
    let keys: Vec<&str> = snapshot.iter().map(|queued| queued.client_key()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(snapshot[0].wait_seconds(clock.now()), 90.0);
}

#[tokio::test]
async fn test_requeue_with_equal_join_time_goes_behind() {
    let (queue, _) = queue();
    queue.add_client(ClientProfile::new("a", 1200)).await.unwrap();
    queue.add_client(ClientProfile::new("b", 1200)).await.unwrap();

    let removed = queue.remove_client("a").await.unwrap();
    queue.requeue(removed).await.unwrap();

    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot[0].client_key(), "b");
    assert_eq!(snapshot[1].client_key(), "a");
}

proptest! {
    #[test]
    fn prop_snapshot_follows_joins_and_leaves(ops in prop::collection::vec((0u8..3, 0u8..6), 0..48)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        runtime.block_on(async {
            let (queue, _) = queue();
            let mut expected: Vec<String> = Vec::new();

            for (op, id) in ops {
                let key = format!("client-{}", id);
                match op {
                    0 => {
                        let joined = queue.add_client(ClientProfile::new(&key, 1200)).await;
                        if expected.contains(&key) {
                            prop_assert_eq!(joined, Err(QueueServiceError::AlreadyQueued));
                        } else {
                            prop_assert!(joined.is_ok());
                            expected.push(key);
                        }
                    }
                    1 => {
                        let left = queue.remove_client(&key).await;
                        match expected.iter().position(|k| *k == key) {
                            Some(index) => {
                                prop_assert!(left.is_ok());
                                expected.remove(index);
                            }
                            None => prop_assert!(left.is_err()),
                        }
                    }
                    _ => {
                        // Every join shares one instant, so a returning client lands last.
                        if let Ok(queued) = queue.remove_client(&key).await {
                            queue.requeue(queued).await.unwrap();
                            expected.retain(|k| *k != key);
                            expected.push(key);
                        }
                    }
                }

                let actual: Vec<String> = queue
                    .snapshot()
                    .await
                    .into_iter()
                    .map(|queued| queued.profile.client_key)
                    .collect();
                prop_assert_eq!(&actual, &expected);
                prop_assert_eq!(queue.len().await, expected.len());
            }

            Ok(())
        })?;
    }
}
