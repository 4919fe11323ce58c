//! The stored version node.

use serde::{Deserialize, Serialize};

use crate::id::ID;

/// One immutable version in the graph.
///
/// Everything except the derived `children` back-references is fixed at
/// creation. Parent and child links are stored as id lists, not references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionNode {
    id: ID,
    parents: Vec<ID>,
    content_ref: String,
    #[serde(with = "serde_bytes", default)]
    metadata: Vec<u8>,
    created_at: String,
    #[serde(default)]
    children: Vec<ID>,
}

impl VersionNode {
    pub(crate) fn new(
        id: ID,
        parents: Vec<ID>,
        content_ref: String,
        metadata: Vec<u8>,
        created_at: String,
    ) -> Self {
        Self {
            id,
            parents,
            content_ref,
            metadata,
            created_at,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &ID {
        &self.id
    }

    /// Parent ids in the order they were given to `append`.
    pub fn parents(&self) -> &[ID] {
        &self.parents
    }

    /// Opaque pointer to the externally stored content.
    pub fn content_ref(&self) -> &str {
        &self.content_ref
    }

    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    /// RFC3339 creation time.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Nodes that cite this node as a parent, in append order.
    pub fn children(&self) -> &[ID] {
        &self.children
    }

    /// A root node has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// A head has no children yet.
    pub fn is_head(&self) -> bool {
        self.children.is_empty()
    }

    /// Record `child` as a child of this node. Returns false if it was already recorded.
    pub(crate) fn add_child(&mut self, child: &ID) -> bool {
        if self.children.contains(child) {
            return false;
        }
        self.children.push(child.clone());
        true
    }
}
