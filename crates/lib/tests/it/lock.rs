use std::time::Duration;

use concord::{
    ID,
    lock::{CheckOut, Lock},
};

use crate::helpers::harness;

fn granted(outcome: CheckOut) -> Lock {
    match outcome {
        CheckOut::Granted(lock) => lock,
        other => panic!("Expected grant, got {other:?}"),
    }
}

#[tokio::test]
async fn test_waiter_acquires_after_check_in() {
    let h = harness();
    let alice = granted(
        h.locks
            .check_out("doc1", "alice", Some(Duration::from_secs(60)), None)
            .await
            .unwrap(),
    );

    let bob = h.locks.check_out("doc1", "bob", None, None).await.unwrap();
    assert_eq!(bob, CheckOut::Queued { position: 1 });

    h.locks.check_in(&alice.id).await.unwrap();

    let bob = granted(h.locks.check_out("doc1", "bob", None, None).await.unwrap());
    assert_eq!(bob.holder, "bob");
    assert_eq!(h.locks.query_locks(Some("doc1")).await.unwrap(), vec![bob]);
}

#[tokio::test]
async fn test_renew_expired_lock_counts_from_now() {
    let h = harness();
    let lock = granted(
        h.locks
            .check_out("doc1", "alice", Some(Duration::from_secs(60)), None)
            .await
            .unwrap(),
    );
    let old_expiry = lock.expires.unwrap();

    h.clock.advance(5 * 60_000);
    let now = old_expiry + 4 * 60_000;

    let renewed = h.locks.renew(&lock.id, Duration::from_secs(30)).await.unwrap();
    assert_eq!(renewed.expires, Some(now + 30_000));
    assert_ne!(renewed.expires, Some(old_expiry + 30_000));

    // Renewal revives the lock for readers.
    assert_eq!(h.locks.query_locks(Some("doc1")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_lapsed_lock_hands_over_to_waiter() {
    let h = harness();
    granted(
        h.locks
            .check_out("doc1", "alice", Some(Duration::from_secs(10)), None)
            .await
            .unwrap(),
    );
    assert_eq!(
        h.locks.check_out("doc1", "bob", None, None).await.unwrap(),
        CheckOut::Queued { position: 1 }
    );

    h.clock.advance(10_000);
    let bob = granted(h.locks.check_out("doc1", "bob", None, None).await.unwrap());
    assert_eq!(bob.holder, "bob");
    assert!(h.locks.query_queue("doc1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_queue_is_fifo_across_waiters() {
    let h = harness();
    granted(h.locks.check_out("doc1", "alice", None, None).await.unwrap());

    for (i, who) in ["bob", "carol", "dave"].into_iter().enumerate() {
        let outcome = h.locks.check_out("doc1", who, None, None).await.unwrap();
        assert_eq!(outcome, CheckOut::Queued { position: i + 1 });
    }
    // Repeated polls do not change anyone's place.
    assert!(matches!(
        h.locks.check_out("doc1", "carol", None, None).await.unwrap(),
        CheckOut::AlreadyLocked { .. }
    ));

    let queue = h.locks.query_queue("doc1").await.unwrap();
    let order: Vec<_> = queue.iter().map(|e| e.requester.as_str()).collect();
    assert_eq!(order, vec!["bob", "carol", "dave"]);
}

#[tokio::test]
async fn test_concurrent_check_outs_grant_one_holder() {
    let h = std::sync::Arc::new(harness());
    let mut tasks = Vec::new();
    for i in 0..8 {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            h.locks
                .check_out("shared", &format!("worker-{i}"), None, None)
                .await
                .unwrap()
        }));
    }

    let mut grants = 0;
    let mut positions = Vec::new();
    for task in tasks {
        match task.await.unwrap() {
            CheckOut::Granted(_) => grants += 1,
            CheckOut::Queued { position } => positions.push(position),
            other => panic!("Unexpected outcome {other:?}"),
        }
    }
    positions.sort();
    assert_eq!(grants, 1);
    assert_eq!(positions, (1..=7).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_unknown_lock_operations_are_not_found() {
    let h = harness();
    let ghost = ID::from("ghost");
    assert!(h.locks.check_in(&ghost).await.unwrap_err().is_not_found());
    assert!(h.locks.renew(&ghost, Duration::from_secs(1)).await.unwrap_err().is_not_found());
    assert!(
        h.locks
            .break_lock(&ghost, "admin", "cleanup")
            .await
            .unwrap_err()
            .is_not_found()
    );
}
