//! Tracked conflicts: detect once, settle automatically or by hand.
//!
//! A detected conflict is stored with status `detected` and stays pending until
//! [`ResolutionRegistry::resolve_conflict`] finds a strategy that merges it, or
//! [`ResolutionRegistry::manual_resolve`] records a person's choice. Settling a
//! conflict twice is reported as [`ManualOutcome::NotPending`] or
//! [`ConflictOutcome::NotPending`], never as a second resolution.

use serde::{Deserialize, Serialize};

use super::{ResolutionError, ResolutionRegistry, ResolveOutcome, detect::detect_conflict};
use crate::{
    Result,
    constants::{CONFLICTS, MANUAL_RESOLVER},
    id::ID,
    store::{self, Filter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStatus {
    Detected,
    Resolved,
}

/// A stored conflict between two values written against the same base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub id: ID,
    pub status: ConflictStatus,
    #[serde(with = "serde_bytes", default)]
    pub base: Option<Vec<u8>>,
    #[serde(with = "serde_bytes")]
    pub v1: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub v2: Vec<u8>,
    pub context: String,
    pub detected_at: String,
    #[serde(default)]
    pub resolved_at: Option<String>,
    /// Winning strategy name, or `manual`.
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(with = "serde_bytes", default)]
    pub chosen: Option<Vec<u8>>,
}

impl ConflictRecord {
    pub fn is_pending(&self) -> bool {
        self.status == ConflictStatus::Detected
    }

    fn settle(&mut self, resolved_by: &str, chosen: Vec<u8>, resolved_at: String) {
        self.status = ConflictStatus::Resolved;
        self.resolved_by = Some(resolved_by.to_string());
        self.chosen = Some(chosen);
        self.resolved_at = Some(resolved_at);
    }
}

/// Outcome of [`ResolutionRegistry::detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Nothing to merge. No record was written.
    NoConflict,
    Detected { conflict_id: ID },
}

/// Outcome of [`ResolutionRegistry::resolve_conflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictOutcome {
    Resolved {
        strategy: String,
        value: Vec<u8>,
        record_id: ID,
    },
    /// No strategy could merge; a person must pick one of `options`.
    RequiresHuman {
        conflict_id: ID,
        reason: String,
        options: Vec<Vec<u8>>,
    },
    /// The conflict was already settled.
    NotPending { reason: String },
}

/// Outcome of [`ResolutionRegistry::manual_resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualOutcome {
    Resolved { value: Vec<u8> },
    /// The conflict is unknown or was already settled.
    NotPending { reason: String },
}

impl ResolutionRegistry {
    /// Compare two values against their base and record a conflict if both diverged.
    pub async fn detect(
        &self,
        base: Option<&[u8]>,
        v1: &[u8],
        v2: &[u8],
        context: &str,
    ) -> Result<Detection> {
        if !detect_conflict(base, v1, v2).is_conflict() {
            return Ok(Detection::NoConflict);
        }

        let record = ConflictRecord {
            id: ID::generate(),
            status: ConflictStatus::Detected,
            base: base.map(<[u8]>::to_vec),
            v1: v1.to_vec(),
            v2: v2.to_vec(),
            context: context.to_string(),
            detected_at: self.clock.now_rfc3339(),
            resolved_at: None,
            resolved_by: None,
            chosen: None,
        };
        self.write_conflict(&record).await?;

        tracing::info!(conflict_id = %record.id, context, "Detected conflict");
        Ok(Detection::Detected {
            conflict_id: record.id,
        })
    }

    /// Fetch a conflict record by id.
    pub async fn conflict(&self, conflict_id: &ID) -> Result<ConflictRecord> {
        store::get_as(&*self.store, CONFLICTS, conflict_id.as_str())
            .await?
            .ok_or_else(|| {
                ResolutionError::ConflictNotFound {
                    conflict_id: conflict_id.clone(),
                }
                .into()
            })
    }

    /// Dispatch a pending conflict through the registered strategies.
    ///
    /// On success the record is marked resolved with the winning strategy. When
    /// every strategy declines the record stays pending and both values are
    /// offered for a manual choice.
    pub async fn resolve_conflict(&self, conflict_id: &ID) -> Result<ConflictOutcome> {
        let _guard = self.conflict_guard.lock().await;
        let mut record = self.conflict(conflict_id).await?;
        if !record.is_pending() {
            return Ok(ConflictOutcome::NotPending {
                reason: "Conflict already resolved".to_string(),
            });
        }

        let outcome = self
            .attempt_resolve(record.base.as_deref(), &record.v1, &record.v2, &record.context)
            .await?;
        match outcome {
            ResolveOutcome::Resolved {
                strategy,
                value,
                record_id,
            } => {
                record.settle(&strategy, value.clone(), self.clock.now_rfc3339());
                self.write_conflict(&record).await?;
                Ok(ConflictOutcome::Resolved {
                    strategy,
                    value,
                    record_id,
                })
            }
            ResolveOutcome::CannotResolve { reason, .. } => {
                tracing::info!(
                    conflict_id = %conflict_id,
                    reason = %reason,
                    "Conflict needs a manual choice"
                );
                Ok(ConflictOutcome::RequiresHuman {
                    conflict_id: conflict_id.clone(),
                    reason,
                    options: vec![record.v1, record.v2],
                })
            }
        }
    }

    /// Settle a pending conflict with a value chosen by a person.
    pub async fn manual_resolve(
        &self,
        conflict_id: &ID,
        chosen: impl Into<Vec<u8>>,
    ) -> Result<ManualOutcome> {
        let _guard = self.conflict_guard.lock().await;
        let stored: Option<ConflictRecord> =
            store::get_as(&*self.store, CONFLICTS, conflict_id.as_str()).await?;
        let Some(mut record) = stored else {
            return Ok(ManualOutcome::NotPending {
                reason: "Conflict not found".to_string(),
            });
        };
        if !record.is_pending() {
            return Ok(ManualOutcome::NotPending {
                reason: "Conflict already resolved".to_string(),
            });
        }

        let chosen = chosen.into();
        record.settle(MANUAL_RESOLVER, chosen.clone(), self.clock.now_rfc3339());
        self.write_conflict(&record).await?;

        tracing::info!(conflict_id = %conflict_id, "Conflict resolved manually");
        Ok(ManualOutcome::Resolved { value: chosen })
    }

    /// Conflicts still waiting to be settled, oldest first.
    pub async fn pending_conflicts(&self) -> Result<Vec<ConflictRecord>> {
        let filter = Filter::new().eq("status", "detected");
        let mut pending: Vec<ConflictRecord> =
            store::find_as(&*self.store, CONFLICTS, Some(&filter)).await?;
        pending.sort_by(|a, b| a.detected_at.cmp(&b.detected_at));
        Ok(pending)
    }

    async fn write_conflict(&self, record: &ConflictRecord) -> Result<()> {
        store::put_as(&*self.store, CONFLICTS, record.id.as_str(), record).await
    }
}
