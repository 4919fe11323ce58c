//! Relation names and fixed strategy parameters.

/// Relation holding version graph nodes, keyed by node id.
pub const VERSION_NODES: &str = "version-node";

/// Relation holding resolution audit records.
pub const RESOLUTION_RECORDS: &str = "resolution-record";

/// Relation holding active locks, keyed by lock id.
pub const LOCKS: &str = "lock";

/// Relation holding lock wait queue entries.
pub const LOCK_QUEUE: &str = "lock-queue";

/// Category reported by every built-in resolution strategy.
pub const RESOLUTION_CATEGORY: &str = "conflict-resolution";

pub const LWW_NAME: &str = "lww";
pub const LWW_PRIORITY: u32 = 10;

pub const ADD_WINS_NAME: &str = "add-wins";
pub const ADD_WINS_PRIORITY: u32 = 20;

pub const MULTI_VALUE_NAME: &str = "multi-value";
pub const MULTI_VALUE_PRIORITY: u32 = 30;

/// JSON field carrying an embedded causal timestamp.
pub const TIMESTAMP_MARKER: &str = "_ts";

/// Relation holding detected conflicts, keyed by conflict id.
pub const CONFLICTS: &str = "conflict";

/// `resolved_by` value of a conflict settled by a person.
pub const MANUAL_RESOLVER: &str = "manual";
