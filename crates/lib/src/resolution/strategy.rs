//! The contract every merge strategy implements.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::{Result, constants::RESOLUTION_CATEGORY};

/// Outcome of a single strategy's attempt to merge two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The strategy produced a merged value.
    Resolved(Vec<u8>),
    /// The strategy cannot merge these inputs. This is an expected outcome.
    CannotResolve { reason: String },
}

impl Resolution {
    pub fn cannot(reason: impl Into<String>) -> Self {
        Resolution::CannotResolve {
            reason: reason.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// The merged value, if any.
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::CannotResolve { .. } => None,
        }
    }
}

/// A deterministic function merging two concurrently written values.
///
/// Implementations must be:
/// - **Commutative**: swapping `v1` and `v2` yields the same outcome.
/// - **Idempotent**: repeating a call with identical inputs yields the same value.
///
/// Lower priorities are tried first by the [`ResolutionRegistry`](super::ResolutionRegistry).
pub trait ResolutionStrategy: Send + Sync + Debug {
    /// Unique name used in audit records.
    fn name(&self) -> &str;

    fn priority(&self) -> u32;

    fn category(&self) -> &str {
        RESOLUTION_CATEGORY
    }

    /// Try to merge `v1` and `v2`, optionally relative to their common `base`.
    ///
    /// `context` is an opaque hint from the caller (for example the field or
    /// document being merged).
    fn attempt_resolve(
        &self,
        base: Option<&[u8]>,
        v1: &[u8],
        v2: &[u8],
        context: &str,
    ) -> Result<Resolution>;
}

/// Registration metadata for a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub name: String,
    pub category: String,
    pub priority: u32,
}

impl StrategyInfo {
    pub fn of(strategy: &dyn ResolutionStrategy) -> Self {
        Self {
            name: strategy.name().to_string(),
            category: strategy.category().to_string(),
            priority: strategy.priority(),
        }
    }
}
