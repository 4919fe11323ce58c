//! Append-only causal version graph.
//!
//! [`VersionGraph`] stores [`VersionNode`]s in the `version-node` relation of a
//! [`Store`]. Nodes are never deleted; the only field that ever changes after
//! creation is a node's list of children.
//!
//! Acyclicity holds by construction: `append` requires every cited parent to
//! exist already, so no node can transitively reference itself.

mod errors;
mod node;
mod traversal;


use std::sync::Arc;

use tokio::sync::Mutex;

pub use errors::GraphError;
pub use node::VersionNode;

use crate::{
    Result,
    clock::{Clock, SystemClock},
    constants::VERSION_NODES,
    id::ID,
    store::{self, Store},
};

/// Append-only DAG of versions with ancestry queries.
pub struct VersionGraph {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    /// Serializes the verify-then-write sequence of `append`.
    append_lock: Mutex<()>,
}

impl VersionGraph {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            append_lock: Mutex::new(()),
        }
    }

    /// Append a new node citing `parents`, returning its id.
    ///
    /// Every parent is verified before anything is written, so an
    /// [`GraphError::UnknownParent`] failure leaves the graph untouched. The node
    /// is written first, then each parent's children list is rewritten; each of
    /// those writes is an idempotent overwrite and safe to replay.
    ///
    /// Repeated parent ids are collapsed, keeping the first occurrence.
    pub async fn append(
        &self,
        parents: &[ID],
        content_ref: impl Into<String>,
        metadata: impl Into<Vec<u8>>,
    ) -> Result<ID> {
        let _guard = self.append_lock.lock().await;

        let mut unique_parents: Vec<ID> = Vec::with_capacity(parents.len());
        for parent in parents {
            if !unique_parents.contains(parent) {
                unique_parents.push(parent.clone());
            }
        }

        let mut parent_nodes = Vec::with_capacity(unique_parents.len());
        for parent in &unique_parents {
            match self.fetch(parent).await? {
                Some(node) => parent_nodes.push(node),
                None => {
                    tracing::debug!(parent = %parent, "Rejecting append with unknown parent");
                    return Err(GraphError::UnknownParent {
                        parent: parent.clone(),
                    }
                    .into());
                }
            }
        }

        let id = ID::generate();
        let node = VersionNode::new(
            id.clone(),
            unique_parents,
            content_ref.into(),
            metadata.into(),
            self.clock.now_rfc3339(),
        );
        self.write(&node).await?;

        for mut parent in parent_nodes {
            if parent.add_child(&id) {
                self.write(&parent).await?;
            }
        }

        tracing::info!(
            node_id = %id,
            parent_count = node.parents().len(),
            "Appended version node"
        );
        Ok(id)
    }

    /// Fetch a node by id.
    pub async fn get_node(&self, id: &ID) -> Result<VersionNode> {
        self.require(id).await
    }

    /// All ancestors of `id` (excluding `id`), ordered so that every node comes
    /// before any node that descends from it.
    pub async fn ancestors(&self, id: &ID) -> Result<Vec<ID>> {
        traversal::ancestors(self, id).await
    }

    /// All descendants of `id` (excluding `id`) in breadth-first order.
    pub async fn descendants(&self, id: &ID) -> Result<Vec<ID>> {
        traversal::descendants(self, id).await
    }

    /// Nearest common ancestor of `a` and `b`, or `None` for disjoint histories.
    ///
    /// If one node is an ancestor of the other (or they are equal), that node is
    /// returned. Otherwise the result is the first node in `a`'s ancestry met by a
    /// breadth-first walk back from `b`; "nearest" means nearest in that walk.
    pub async fn common_ancestor(&self, a: &ID, b: &ID) -> Result<Option<ID>> {
        traversal::common_ancestor(self, a, b).await
    }

    /// A directed path from `from` to `to`, each node a parent of the next.
    ///
    /// The path is the first one found by a depth-first search and is not
    /// guaranteed to be the shortest. Fails with [`GraphError::NoPath`] when
    /// `from` is not an ancestor of `to`.
    pub async fn between(&self, from: &ID, to: &ID) -> Result<Vec<ID>> {
        traversal::between(self, from, to).await
    }

    /// Whether `ancestor` is a strict ancestor of `descendant`.
    pub async fn is_ancestor(&self, ancestor: &ID, descendant: &ID) -> Result<bool> {
        traversal::is_ancestor(self, ancestor, descendant).await
    }

    /// Whether `a` and `b` are concurrent: distinct, and neither an ancestor of the other.
    pub async fn is_concurrent(&self, a: &ID, b: &ID) -> Result<bool> {
        if a == b {
            self.require(a).await?;
            return Ok(false);
        }
        Ok(!self.is_ancestor(a, b).await? && !self.is_ancestor(b, a).await?)
    }

    /// Nodes without children, ordered by id.
    pub async fn heads(&self) -> Result<Vec<ID>> {
        let nodes: Vec<VersionNode> = store::find_as(&*self.store, VERSION_NODES, None).await?;
        Ok(nodes
            .into_iter()
            .filter(VersionNode::is_head)
            .map(|node| node.id().clone())
            .collect())
    }

    /// Number of nodes in the graph.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.store.find(VERSION_NODES, None).await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub(crate) async fn fetch(&self, id: &ID) -> Result<Option<VersionNode>> {
        store::get_as(&*self.store, VERSION_NODES, id.as_str()).await
    }

    pub(crate) async fn require(&self, id: &ID) -> Result<VersionNode> {
        self.fetch(id)
            .await?
            .ok_or_else(|| GraphError::NodeNotFound { id: id.clone() }.into())
    }

    /// Fetch a node that another stored node links to.
    pub(crate) async fn follow(&self, from: &ID, link: &ID) -> Result<VersionNode> {
        self.fetch(link).await?.ok_or_else(|| {
            tracing::error!(node = %from, missing = %link, "Dangling link in version graph");
            GraphError::DanglingReference {
                node: from.clone(),
                missing: link.clone(),
            }
            .into()
        })
    }

    async fn write(&self, node: &VersionNode) -> Result<()> {
        store::put_as(&*self.store, VERSION_NODES, node.id().as_str(), node).await
    }
}

impl std::fmt::Debug for VersionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionGraph")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
