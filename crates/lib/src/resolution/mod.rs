//! Automatic conflict resolution for concurrently written values.
//!
//! A [`ResolutionRegistry`] holds an ordered list of [`ResolutionStrategy`]
//! implementations. [`ResolutionRegistry::attempt_resolve`] tries them in
//! ascending priority order; the first one that produces a value wins. When
//! none can, the caller gets [`ResolveOutcome::CannotResolve`] and is expected
//! to fall back to pessimistic locking.
//!
//! Three strategies ship with the crate:
//! - [`LastWriterWins`] keeps the value with the later causal timestamp.
//! - [`AddWins`] unions two string sets.
//! - [`MultiValue`] keeps both values.
//!
//! Conflicts can also be tracked: [`ResolutionRegistry::detect`] stores a
//! [`ConflictRecord`] that stays pending until it is resolved by a strategy or
//! by hand.

mod add_wins;
mod conflict;
mod detect;
mod errors;
mod lww;
mod multi_value;
mod record;
mod strategy;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use add_wins::AddWins;
pub use conflict::{ConflictOutcome, ConflictRecord, ConflictStatus, Detection, ManualOutcome};
pub use detect::{Conflict, detect_conflict};
pub use errors::ResolutionError;
pub use lww::{LastWriterWins, extract_timestamp};
pub use multi_value::{MultiValue, decode_pair};
pub use record::ResolutionRecord;
pub use strategy::{Resolution, ResolutionStrategy, StrategyInfo};

use crate::{
    Result,
    clock::{Clock, SystemClock},
    constants::RESOLUTION_RECORDS,
    id::ID,
    store::{self, Filter, Store},
};

/// One strategy's failed attempt during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: String,
    pub reason: String,
}

/// Outcome of dispatching two values through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved {
        /// Strategy that produced the value.
        strategy: String,
        value: Vec<u8>,
        /// Id of the audit record written for this resolution.
        record_id: ID,
    },
    /// No registered strategy could merge the values.
    CannotResolve {
        reason: String,
        /// Every strategy tried, in dispatch order.
        attempts: Vec<Attempt>,
    },
}

impl ResolveOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolveOutcome::Resolved { .. })
    }

    pub fn value(&self) -> Option<&[u8]> {
        match self {
            ResolveOutcome::Resolved { value, .. } => Some(value),
            ResolveOutcome::CannotResolve { .. } => None,
        }
    }

    /// Name of the winning strategy.
    pub fn strategy(&self) -> Option<&str> {
        match self {
            ResolveOutcome::Resolved { strategy, .. } => Some(strategy),
            ResolveOutcome::CannotResolve { .. } => None,
        }
    }
}

/// Priority-ordered set of merge strategies with an audit trail.
pub struct ResolutionRegistry {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    /// Kept sorted by ascending priority; ties keep registration order.
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
    /// Serializes read-modify-write of conflict records.
    conflict_guard: Mutex<()>,
}

impl ResolutionRegistry {
    /// A registry with no strategies.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            strategies: Vec::new(),
            conflict_guard: Mutex::new(()),
        }
    }

    /// A registry holding the three built-in strategies.
    pub fn with_defaults(store: Arc<dyn Store>) -> Self {
        Self::new(store).add_defaults()
    }

    /// Like [`with_defaults`](Self::with_defaults), with an injected clock.
    pub fn with_defaults_and_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(store, clock).add_defaults()
    }

    fn add_defaults(mut self) -> Self {
        let defaults: [Arc<dyn ResolutionStrategy>; 3] = [
            Arc::new(LastWriterWins),
            Arc::new(AddWins),
            Arc::new(MultiValue),
        ];
        self.strategies = defaults.into();
        self
    }

    /// Add a strategy, keeping dispatch order sorted by priority.
    pub fn register(&mut self, strategy: Arc<dyn ResolutionStrategy>) -> Result<()> {
        if self.strategies.iter().any(|s| s.name() == strategy.name()) {
            return Err(ResolutionError::DuplicateStrategy {
                name: strategy.name().to_string(),
            }
            .into());
        }

        tracing::debug!(
            strategy = strategy.name(),
            priority = strategy.priority(),
            "Registered resolution strategy"
        );
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.priority());
        Ok(())
    }

    /// Registered strategies in dispatch order.
    pub fn strategies(&self) -> Vec<StrategyInfo> {
        self.strategies
            .iter()
            .map(|s| StrategyInfo::of(s.as_ref()))
            .collect()
    }

    /// Try each strategy in priority order until one resolves.
    ///
    /// A successful resolution writes one [`ResolutionRecord`]. If every
    /// strategy declines, the outcome's reason lists each strategy's reason.
    pub async fn attempt_resolve(
        &self,
        base: Option<&[u8]>,
        v1: &[u8],
        v2: &[u8],
        context: &str,
    ) -> Result<ResolveOutcome> {
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            match strategy.attempt_resolve(base, v1, v2, context)? {
                Resolution::Resolved(value) => {
                    let record = ResolutionRecord {
                        id: ID::generate(),
                        strategy: strategy.name().to_string(),
                        base: base.map(<[u8]>::to_vec),
                        v1: v1.to_vec(),
                        v2: v2.to_vec(),
                        result: value.clone(),
                        context: context.to_string(),
                        resolved_at: self.clock.now_rfc3339(),
                    };
                    store::put_as(&*self.store, RESOLUTION_RECORDS, record.id.as_str(), &record)
                        .await?;

                    tracing::info!(
                        strategy = strategy.name(),
                        context,
                        record_id = %record.id,
                        "Resolved concurrent values"
                    );
                    return Ok(ResolveOutcome::Resolved {
                        strategy: record.strategy,
                        value,
                        record_id: record.id,
                    });
                }
                Resolution::CannotResolve { reason } => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        reason = %reason,
                        "Strategy declined to resolve"
                    );
                    attempts.push(Attempt {
                        strategy: strategy.name().to_string(),
                        reason,
                    });
                }
            }
        }

        let reason = if attempts.is_empty() {
            "no resolution strategies registered".to_string()
        } else {
            attempts
                .iter()
                .map(|a| format!("{}: {}", a.strategy, a.reason))
                .collect::<Vec<_>>()
                .join("; ")
        };
        tracing::debug!(context, reason = %reason, "No strategy could resolve values");
        Ok(ResolveOutcome::CannotResolve { reason, attempts })
    }

    /// Audit records, optionally restricted to one strategy.
    pub async fn records(&self, strategy: Option<&str>) -> Result<Vec<ResolutionRecord>> {
        let filter = strategy.map(|name| Filter::new().eq("strategy", name));
        store::find_as(&*self.store, RESOLUTION_RECORDS, filter.as_ref()).await
    }
}

impl std::fmt::Debug for ResolutionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionRegistry")
            .field("strategies", &self.strategies)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
