//! The calling-layer flow: append, detect divergence, merge or lock.

use std::time::Duration;

use concord::{
    lock::CheckOut,
    resolution::{Conflict, ResolveOutcome, detect_conflict},
};

use crate::helpers::harness;

#[tokio::test]
async fn test_diverging_edits_merge_into_one_head() {
    let h = harness();
    let base = br#"["draft"]"#;
    let root = h.graph.append(&[], "blob:v0", base.to_vec()).await.unwrap();

    let left_value = br#"["draft","reviewed"]"#;
    let right_value = br#"["draft","urgent"]"#;
    let left = h.graph.append(&[root.clone()], "blob:left", left_value.to_vec()).await.unwrap();
    let right = h.graph.append(&[root.clone()], "blob:right", right_value.to_vec()).await.unwrap();

    assert!(h.graph.is_concurrent(&left, &right).await.unwrap());
    let common = h.graph.common_ancestor(&left, &right).await.unwrap().unwrap();
    let base_node = h.graph.get_node(&common).await.unwrap();
    assert_eq!(
        detect_conflict(Some(base_node.metadata()), left_value, right_value),
        Conflict::Conflict
    );

    let outcome = h
        .registry
        .attempt_resolve(Some(base_node.metadata()), left_value, right_value, "labels")
        .await
        .unwrap();
    let ResolveOutcome::Resolved { value, .. } = outcome else {
        panic!("Expected labels to merge, got {outcome:?}");
    };
    assert_eq!(value, br#"["draft","reviewed","urgent"]"#.to_vec());

    let merged = h
        .graph
        .append(&[left.clone(), right.clone()], "blob:merged", value)
        .await
        .unwrap();
    assert_eq!(h.graph.heads().await.unwrap(), vec![merged.clone()]);

    let path = h.graph.between(&root, &merged).await.unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(h.registry.records(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unmergeable_edit_falls_back_to_lock() {
    let mut h = harness();
    // Only LWW: binary values without timestamps cannot merge.
    h.registry = concord::ResolutionRegistry::with_clock(h.store.clone(), h.clock.clone());
    h.registry
        .register(std::sync::Arc::new(concord::resolution::LastWriterWins))
        .unwrap();

    let outcome = h
        .registry
        .attempt_resolve(None, &[0x89, 0x50], &[0x89, 0x51], "logo.png")
        .await
        .unwrap();
    assert!(!outcome.is_resolved());

    let lock = match h
        .locks
        .check_out("logo.png", "alice", Some(Duration::from_secs(300)), Some("redraw".into()))
        .await
        .unwrap()
    {
        CheckOut::Granted(lock) => lock,
        other => panic!("Expected grant, got {other:?}"),
    };

    let head = h.graph.append(&[], "blob:logo-v1", Vec::new()).await.unwrap();
    assert_eq!(
        h.locks.check_out("logo.png", "bob", None, None).await.unwrap(),
        CheckOut::Queued { position: 1 }
    );

    h.graph.append(&[head], "blob:logo-v2", Vec::new()).await.unwrap();
    h.locks.check_in(&lock.id).await.unwrap();
    assert!(h.locks.check_out("logo.png", "bob", None, None).await.unwrap().is_granted());
}
