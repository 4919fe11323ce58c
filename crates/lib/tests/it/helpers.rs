use std::sync::Arc;

use concord::{
    ID, LockManager, ManualClock, ResolutionRegistry, VersionGraph,
    store::{InMemory, Store},
};

/// Every component over one shared store and one manual clock.
pub struct Harness {
    pub store: Arc<InMemory>,
    pub clock: Arc<ManualClock>,
    pub graph: VersionGraph,
    pub registry: ResolutionRegistry,
    pub locks: LockManager,
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemory::new());
    let clock = Arc::new(ManualClock::default());
    let shared: Arc<dyn Store> = store.clone();
    Harness {
        graph: VersionGraph::with_clock(shared.clone(), clock.clone()),
        registry: ResolutionRegistry::with_defaults_and_clock(shared.clone(), clock.clone()),
        locks: LockManager::with_clock(shared, clock.clone()),
        store,
        clock,
    }
}

pub fn graph() -> VersionGraph {
    harness().graph
}

/// Append a chain of `len` nodes starting from a new root, returning ids root first.
pub async fn chain(graph: &VersionGraph, len: usize) -> Vec<ID> {
    let mut ids: Vec<ID> = Vec::with_capacity(len);
    for i in 0..len {
        let parents: Vec<ID> = ids.last().cloned().into_iter().collect();
        let id = graph
            .append(&parents, format!("blob:{i}"), Vec::new())
            .await
            .expect("Failed to append chain node");
        ids.push(id);
    }
    ids
}

/// root -> left, root -> right, (left, right) -> merge
pub async fn diamond(graph: &VersionGraph) -> (ID, ID, ID, ID) {
    let root = graph.append(&[], "blob:root", Vec::new()).await.unwrap();
    let left = graph.append(&[root.clone()], "blob:left", Vec::new()).await.unwrap();
    let right = graph.append(&[root.clone()], "blob:right", Vec::new()).await.unwrap();
    let merge = graph
        .append(&[left.clone(), right.clone()], "blob:merge", Vec::new())
        .await
        .unwrap();
    (root, left, right, merge)
}

/// Assert that `path` is a directed parent-to-child path from `from` to `to`.
pub async fn assert_valid_path(graph: &VersionGraph, path: &[ID], from: &ID, to: &ID) {
    assert_eq!(path.first(), Some(from));
    assert_eq!(path.last(), Some(to));
    for pair in path.windows(2) {
        let child = graph.get_node(&pair[1]).await.unwrap();
        assert!(
            child.parents().contains(&pair[0]),
            "{} is not a parent of {}",
            pair[0],
            pair[1]
        );
    }
}
