use std::collections::{HashMap, HashSet};

use concord::{ID, VersionGraph, graph::GraphError};

use crate::helpers::{assert_valid_path, chain, diamond, graph};

/// Builds a layered DAG where node `i` cites `i - 1` and, for every third
/// node, also `i / 2`. Returns ids in append order and each node's parents.
async fn layered(graph: &VersionGraph, size: usize) -> (Vec<ID>, HashMap<ID, Vec<ID>>) {
    let mut ids: Vec<ID> = Vec::new();
    let mut parents_of = HashMap::new();
    for i in 0..size {
        let mut parents = Vec::new();
        if i > 0 {
            parents.push(ids[i - 1].clone());
        }
        if i > 2 && i % 3 == 0 {
            parents.push(ids[i / 2].clone());
        }
        let id = graph.append(&parents, format!("blob:{i}"), Vec::new()).await.unwrap();
        parents_of.insert(id.clone(), parents);
        ids.push(id);
    }
    (ids, parents_of)
}

fn expected_ancestors(parents_of: &HashMap<ID, Vec<ID>>, id: &ID) -> HashSet<ID> {
    let mut seen = HashSet::new();
    let mut stack = parents_of[id].clone();
    while let Some(next) = stack.pop() {
        if seen.insert(next.clone()) {
            stack.extend(parents_of[&next].iter().cloned());
        }
    }
    seen
}

#[tokio::test]
async fn test_ancestors_are_exactly_the_transitive_parents() {
    let graph = graph();
    let (ids, parents_of) = layered(&graph, 24).await;

    for id in &ids {
        let ancestors = graph.ancestors(id).await.unwrap();
        assert!(!ancestors.contains(id), "{id} listed as its own ancestor");

        let found: HashSet<ID> = ancestors.iter().cloned().collect();
        assert_eq!(found.len(), ancestors.len(), "duplicate ancestors for {id}");
        assert_eq!(found, expected_ancestors(&parents_of, id));

        // Every ancestor appears after all of its own ancestors.
        let position: HashMap<&ID, usize> =
            ancestors.iter().enumerate().map(|(i, a)| (a, i)).collect();
        for ancestor in &ancestors {
            for parent in &parents_of[ancestor] {
                assert!(position[parent] < position[ancestor]);
            }
        }
    }
}

#[tokio::test]
async fn test_descendants_mirror_ancestors() {
    let graph = graph();
    let (ids, parents_of) = layered(&graph, 15).await;

    for id in &ids {
        let descendants: HashSet<ID> =
            graph.descendants(id).await.unwrap().into_iter().collect();
        let expected: HashSet<ID> = ids
            .iter()
            .filter(|other| expected_ancestors(&parents_of, other).contains(id))
            .cloned()
            .collect();
        assert_eq!(descendants, expected);
    }
}

#[tokio::test]
async fn test_common_ancestor_of_ancestor_pair_is_the_ancestor() {
    let graph = graph();
    let ids = chain(&graph, 5).await;

    assert_eq!(graph.common_ancestor(&ids[1], &ids[4]).await.unwrap(), Some(ids[1].clone()));
    assert_eq!(graph.common_ancestor(&ids[4], &ids[1]).await.unwrap(), Some(ids[1].clone()));
    assert_eq!(graph.common_ancestor(&ids[0], &ids[1]).await.unwrap(), Some(ids[0].clone()));
    assert_eq!(graph.common_ancestor(&ids[2], &ids[2]).await.unwrap(), Some(ids[2].clone()));
}

#[tokio::test]
async fn test_common_ancestor_of_concurrent_branches() {
    let graph = graph();
    let (root, left, right, _) = diamond(&graph).await;
    let left_tip = graph.append(&[left.clone()], "blob:l2", Vec::new()).await.unwrap();

    assert_eq!(graph.common_ancestor(&left_tip, &right).await.unwrap(), Some(root.clone()));
    assert_eq!(graph.common_ancestor(&right, &left_tip).await.unwrap(), Some(root));
}

#[tokio::test]
async fn test_common_ancestor_of_disjoint_histories() {
    let graph = graph();
    let a = graph.append(&[], "blob:a", Vec::new()).await.unwrap();
    let b = graph.append(&[], "blob:b", Vec::new()).await.unwrap();
    assert_eq!(graph.common_ancestor(&a, &b).await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_parent_leaves_graph_unchanged() {
    let graph = graph();
    let ids = chain(&graph, 3).await;
    let before = graph.len().await.unwrap();

    let err = graph
        .append(&[ids[2].clone(), ID::from("never-written")], "blob:x", Vec::new())
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert!(matches!(
        err,
        concord::Error::Graph(GraphError::UnknownParent { ref parent }) if parent == "never-written"
    ));

    assert_eq!(graph.len().await.unwrap(), before);
    assert!(graph.get_node(&ids[2]).await.unwrap().children().is_empty());
}

#[tokio::test]
async fn test_between_returns_a_valid_path() {
    let graph = graph();
    let (ids, _) = layered(&graph, 20).await;

    let path = graph.between(&ids[3], &ids[19]).await.unwrap();
    assert_valid_path(&graph, &path, &ids[3], &ids[19]).await;

    let path = graph.between(&ids[0], &ids[0]).await.unwrap();
    assert_eq!(path, vec![ids[0].clone()]);
}

#[tokio::test]
async fn test_between_without_ancestry_is_no_path() {
    let graph = graph();
    let (_, left, right, merge) = diamond(&graph).await;

    for (from, to) in [(&left, &right), (&merge, &left)] {
        match graph.between(from, to).await {
            Err(concord::Error::Graph(GraphError::NoPath { .. })) => {}
            other => panic!("Expected NoPath, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_heads_track_divergence() {
    let graph = graph();
    let root = graph.append(&[], "blob:root", Vec::new()).await.unwrap();
    let a = graph.append(&[root.clone()], "blob:a", Vec::new()).await.unwrap();
    let b = graph.append(&[root.clone()], "blob:b", Vec::new()).await.unwrap();

    let mut expected = vec![a.clone(), b.clone()];
    expected.sort();
    assert_eq!(graph.heads().await.unwrap(), expected);
    assert!(graph.is_concurrent(&a, &b).await.unwrap());

    let merged = graph.append(&[a, b], "blob:merged", Vec::new()).await.unwrap();
    assert_eq!(graph.heads().await.unwrap(), vec![merged.clone()]);
    assert!(graph.is_ancestor(&root, &merged).await.unwrap());
}

#[tokio::test]
async fn test_queries_on_unknown_node_are_not_found() {
    let graph = graph();
    let ghost = ID::from("ghost");
    assert!(graph.get_node(&ghost).await.unwrap_err().is_not_found());
    assert!(graph.ancestors(&ghost).await.unwrap_err().is_not_found());
    assert!(graph.descendants(&ghost).await.unwrap_err().is_not_found());
}
