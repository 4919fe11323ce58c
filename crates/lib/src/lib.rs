//!
//! Concord: concurrency safety for shared, evolving content.
//! This library provides the core components for recording, reconciling, and serializing
//! edits.
//!
//! ## Core Concepts
//!
//! Concord is built around three components that share nothing but a storage interface:
//!
//! * **VersionGraph (`graph::VersionGraph`)**: An append-only causal DAG of immutable version
//!   nodes. Each node cites zero or more existing parents and an opaque content reference.
//! * **ResolutionRegistry (`resolution::ResolutionRegistry`)**: Pluggable merge strategies tried in
//!   priority order against two concurrent values:
//!     * **LastWriterWins (`resolution::LastWriterWins`)**: keeps the value with the later
//!       causal timestamp.
//!     * **AddWins (`resolution::AddWins`)**: OR-Set union of two string collections.
//!     * **MultiValue (`resolution::MultiValue`)**: keeps both values as a sorted pair.
//! * **LockManager (`lock::LockManager`)**: Exclusive, optionally expiring locks per resource
//!   with a FIFO wait queue, used when no strategy can merge.
//! * **Store (`store::Store`)**: The keyed persistence primitive (`get`/`put`/`find`/`del`) every
//!   component is built on. `store::InMemory` is the bundled implementation.
//!
//! Composition happens in the calling layer: append a node, merge diverging heads through the
//! registry, and fall back to a lock when the registry reports `CannotResolve`.

pub mod clock;
pub mod constants;
pub mod graph;
pub mod id;
pub mod lock;
pub mod resolution;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use graph::VersionGraph;
pub use id::ID;
pub use lock::LockManager;
pub use resolution::ResolutionRegistry;

/// Result type used throughout the Concord library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Concord library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured version graph errors from the graph module
    #[error(transparent)]
    Graph(graph::GraphError),

    /// Structured resolution errors from the resolution module
    #[error(transparent)]
    Resolution(resolution::ResolutionError),

    /// Structured lock errors from the lock module
    #[error(transparent)]
    Lock(lock::LockError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Graph(_) => "graph",
            Error::Resolution(_) => "resolution",
            Error::Lock(_) => "lock",
        }
    }

    /// Check if this error indicates a referenced entity was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Graph(graph_err) => graph_err.is_not_found(),
            Error::Lock(lock_err) => lock_err.is_not_found(),
            Error::Resolution(resolution_err) => resolution_err.is_not_found(),
            Error::Store(_) => false,
        }
    }

    /// Check if this error indicates stored data contradicts itself.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Graph(graph_err) => graph_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error came from the storage layer rather than a domain rule.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error indicates the caller supplied invalid input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Graph(graph_err) => graph_err.is_validation_error(),
            Error::Resolution(resolution_err) => resolution_err.is_registration_error(),
            _ => false,
        }
    }

    /// Check if this error is version graph related.
    pub fn is_graph_error(&self) -> bool {
        matches!(self, Error::Graph(_))
    }

    /// Check if this error is lock related.
    pub fn is_lock_error(&self) -> bool {
        matches!(self, Error::Lock(_))
    }
}
