//! Keyed persistence for Concord components.
//!
//! The [`Store`] trait is the only I/O the components perform. It offers atomic
//! per-record `get`/`put`/`del` and a filtered scan (`find`), but no cross-record
//! transactions; components order their writes so that a failure part way
//! through never leaves a half-applied domain change visible.
//!
//! Records are plain JSON values grouped into named relations. The typed helpers
//! ([`get_as`], [`put_as`], [`find_as`]) convert to and from serde types.

mod errors;
mod in_memory;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

pub use errors::StoreError;
pub use in_memory::InMemory;

use crate::Result;

/// A stored record.
pub type Record = Value;

/// Conjunction of top-level field equalities used to narrow a `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// An empty filter, matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Whether `record` satisfies every condition of this filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Storage trait abstracting the keyed record store shared by all components.
///
/// Implementations must make each individual call atomic. Nothing else is
/// assumed: callers that need a check-then-set sequence serialize it themselves.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the record stored under `id` in `relation`.
    async fn get(&self, relation: &str, id: &str) -> Result<Option<Record>>;

    /// Store `record` under `id`, replacing any previous record.
    async fn put(&self, relation: &str, id: &str, record: Record) -> Result<()>;

    /// List the records of `relation` that match `filter` (all of them when `None`).
    ///
    /// Order must be stable across calls that observe the same state.
    async fn find(&self, relation: &str, filter: Option<&Filter>) -> Result<Vec<Record>>;

    /// Remove the record under `id`. Returns whether a record was removed.
    async fn del(&self, relation: &str, id: &str) -> Result<bool>;
}

/// Fetch a record and decode it as `T`.
pub async fn get_as<T: DeserializeOwned>(
    store: &dyn Store,
    relation: &str,
    id: &str,
) -> Result<Option<T>> {
    match store.get(relation, id).await? {
        Some(record) => Ok(Some(decode(relation, record)?)),
        None => Ok(None),
    }
}

/// Encode `value` and store it under `id`.
pub async fn put_as<T: Serialize>(
    store: &dyn Store,
    relation: &str,
    id: &str,
    value: &T,
) -> Result<()> {
    let record = serde_json::to_value(value).map_err(|e| StoreError::SerializationFailed {
        relation: relation.to_string(),
        id: id.to_string(),
        source: e,
    })?;
    store.put(relation, id, record).await
}

/// Find records and decode each of them as `T`.
pub async fn find_as<T: DeserializeOwned>(
    store: &dyn Store,
    relation: &str,
    filter: Option<&Filter>,
) -> Result<Vec<T>> {
    store
        .find(relation, filter)
        .await?
        .into_iter()
        .map(|record| decode(relation, record))
        .collect()
}

fn decode<T: DeserializeOwned>(relation: &str, record: Record) -> Result<T> {
    serde_json::from_value(record).map_err(|e| {
        StoreError::DeserializationFailed {
            relation: relation.to_string(),
            source: e,
        }
        .into()
    })
}
