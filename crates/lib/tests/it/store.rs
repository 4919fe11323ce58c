use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use concord::{
    LockManager, ManualClock, Result, VersionGraph,
    constants::{LOCKS, VERSION_NODES},
    store::{Filter, InMemory, Record, Store, StoreError},
};
use serde_json::json;

/// Reads from an inner store but refuses every write.
struct ReadOnly(InMemory);

#[async_trait]
impl Store for ReadOnly {
    async fn get(&self, relation: &str, id: &str) -> Result<Option<Record>> {
        self.0.get(relation, id).await
    }

    async fn put(&self, _relation: &str, _id: &str, _record: Record) -> Result<()> {
        Err(StoreError::Backend {
            reason: "read-only".to_string(),
        }
        .into())
    }

    async fn find(&self, relation: &str, filter: Option<&Filter>) -> Result<Vec<Record>> {
        self.0.find(relation, filter).await
    }

    async fn del(&self, _relation: &str, _id: &str) -> Result<bool> {
        Err(StoreError::Backend {
            reason: "read-only".to_string(),
        }
        .into())
    }
}

#[tokio::test]
async fn test_component_state_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concord.json");
    let clock = Arc::new(ManualClock::default());

    let (root, tip, lock_id) = {
        let store = Arc::new(InMemory::new());
        let graph = VersionGraph::with_clock(store.clone(), clock.clone());
        let locks = LockManager::with_clock(store.clone(), clock.clone());

        let root = graph.append(&[], "blob:root", b"meta".to_vec()).await.unwrap();
        let mid = graph.append(&[root.clone()], "blob:mid", Vec::new()).await.unwrap();
        let tip = graph.append(&[mid], "blob:tip", Vec::new()).await.unwrap();
        let lock = locks
            .check_out("doc1", "alice", Some(Duration::from_secs(60)), None)
            .await
            .unwrap();

        store.save_to_file(&path).await.unwrap();
        (root, tip, lock.lock().unwrap().id.clone())
    };

    let store = Arc::new(InMemory::load_from_file(&path).await.unwrap());
    assert_eq!(store.count(VERSION_NODES).await, 3);
    assert_eq!(store.count(LOCKS).await, 1);

    let graph = VersionGraph::with_clock(store.clone(), clock.clone());
    let ancestors = graph.ancestors(&tip).await.unwrap();
    assert_eq!(ancestors.first(), Some(&root));
    assert_eq!(graph.get_node(&root).await.unwrap().metadata(), b"meta");

    let locks = LockManager::with_clock(store, clock);
    assert_eq!(locks.get_lock(&lock_id).await.unwrap().holder, "alice");
}

#[tokio::test]
async fn test_corrupt_record_surfaces_as_storage_error() {
    let store = Arc::new(InMemory::new());
    store
        .put(VERSION_NODES, "bad", json!({"id": "bad", "parents": 42}))
        .await
        .unwrap();

    let graph = VersionGraph::new(store);
    let err = graph.get_node(&"bad".into()).await.unwrap_err();
    assert!(err.is_storage_error());
    assert_eq!(err.module(), "store");
}

#[tokio::test]
async fn test_malformed_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_storage_error());
}

#[tokio::test]
async fn test_storage_faults_propagate_unchanged() {
    let graph = VersionGraph::new(Arc::new(ReadOnly(InMemory::new())));
    let err = graph.append(&[], "blob:x", Vec::new()).await.unwrap_err();
    assert!(matches!(
        err,
        concord::Error::Store(StoreError::Backend { ref reason }) if reason == "read-only"
    ));
    assert!(!err.is_not_found());
    assert!(graph.is_empty().await.unwrap());

    let locks = LockManager::new(Arc::new(ReadOnly(InMemory::new())));
    let err = locks.check_out("doc1", "alice", None, None).await.unwrap_err();
    assert!(err.is_storage_error());
}
