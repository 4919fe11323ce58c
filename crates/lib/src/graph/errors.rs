//! Version graph error types.

use thiserror::Error;

use crate::id::ID;

/// Errors raised by [`VersionGraph`](super::VersionGraph) operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// The referenced node does not exist.
    #[error("Node not in graph: {id}")]
    NodeNotFound { id: ID },

    /// `append` cited a parent that does not exist. The graph is unchanged.
    #[error("Parent node not found in graph: {parent}")]
    UnknownParent { parent: ID },

    /// `from` is not an ancestor of `to`.
    #[error("No directed path from {from} to {to}")]
    NoPath { from: ID, to: ID },

    /// A stored node references a node that is missing from the store.
    #[error("Node {node} references missing node {missing}")]
    DanglingReference { node: ID, missing: ID },
}

impl GraphError {
    /// Check if this error indicates a node was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NodeNotFound { .. })
    }

    /// Check if this error was caused by the caller's input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, GraphError::UnknownParent { .. })
    }

    /// Check if this error indicates the stored graph is inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, GraphError::DanglingReference { .. })
    }

    /// Check if this error reports a missing path.
    pub fn is_no_path(&self) -> bool {
        matches!(self, GraphError::NoPath { .. })
    }

    /// Get the node ID this error is about, if any.
    pub fn node_id(&self) -> Option<&ID> {
        match self {
            GraphError::NodeNotFound { id } => Some(id),
            GraphError::UnknownParent { parent } => Some(parent),
            GraphError::DanglingReference { node, .. } => Some(node),
            GraphError::NoPath { .. } => None,
        }
    }
}

impl From<GraphError> for crate::Error {
    fn from(err: GraphError) -> Self {
        crate::Error::Graph(err)
    }
}
