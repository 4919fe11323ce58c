//! In-memory store implementation
//!
//! This module provides an in-memory implementation of the [`Store`] trait,
//! suitable for tests, single-process deployments, and the command-line tool,
//! which saves the whole state to a JSON file between runs.

mod persistence;

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Filter, Record, Store};
use crate::Result;

/// Records of one relation, ordered by id so scans are deterministic.
pub(crate) type Relation = BTreeMap<String, Record>;

/// A simple in-memory store using ordered maps for storage.
///
/// Every call takes the internal lock once, so each `get`/`put`/`del` is atomic.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) relations: RwLock<BTreeMap<String, Relation>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in `relation`.
    pub async fn count(&self, relation: &str) -> usize {
        self.relations
            .read()
            .await
            .get(relation)
            .map_or(0, BTreeMap::len)
    }

    /// Saves the entire store to a file as JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from a JSON file written by [`InMemory::save_to_file`].
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl Store for InMemory {
    async fn get(&self, relation: &str, id: &str) -> Result<Option<Record>> {
        let relations = self.relations.read().await;
        Ok(relations.get(relation).and_then(|r| r.get(id)).cloned())
    }

    async fn put(&self, relation: &str, id: &str, record: Record) -> Result<()> {
        let mut relations = self.relations.write().await;
        relations
            .entry(relation.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }

    async fn find(&self, relation: &str, filter: Option<&Filter>) -> Result<Vec<Record>> {
        let relations = self.relations.read().await;
        let Some(records) = relations.get(relation) else {
            return Ok(Vec::new());
        };
        Ok(records
            .values()
            .filter(|record| filter.is_none_or(|f| f.matches(record)))
            .cloned()
            .collect())
    }

    async fn del(&self, relation: &str, id: &str) -> Result<bool> {
        let mut relations = self.relations.write().await;
        let removed = relations
            .get_mut(relation)
            .is_some_and(|records| records.remove(id).is_some());
        Ok(removed)
    }
}
