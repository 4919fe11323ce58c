//! Add-Wins (OR-Set) merge for set-like content such as tags or memberships.

use std::collections::BTreeSet;

use super::{Resolution, ResolutionError, ResolutionStrategy};
use crate::{
    Result,
    constants::{ADD_WINS_NAME, ADD_WINS_PRIORITY},
};

/// Unions two JSON string arrays.
///
/// Anything present on either side survives, so a concurrent addition always
/// beats a concurrent removal. The result is sorted, which makes the merge
/// independent of argument order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddWins;

impl ResolutionStrategy for AddWins {
    fn name(&self) -> &str {
        ADD_WINS_NAME
    }

    fn priority(&self) -> u32 {
        ADD_WINS_PRIORITY
    }

    fn attempt_resolve(
        &self,
        _base: Option<&[u8]>,
        v1: &[u8],
        v2: &[u8],
        _context: &str,
    ) -> Result<Resolution> {
        let (Some(set1), Some(set2)) = (parse_set(v1), parse_set(v2)) else {
            return Ok(Resolution::cannot("Content is not a set-like structure"));
        };

        let union: BTreeSet<String> = set1.into_iter().chain(set2).collect();
        let merged = serde_json::to_vec(&union).map_err(|e| ResolutionError::EncodingFailed {
            strategy: ADD_WINS_NAME.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Resolution::Resolved(merged))
    }
}

/// Parse a JSON array whose elements are all strings.
fn parse_set(value: &[u8]) -> Option<Vec<String>> {
    serde_json::from_slice::<Vec<String>>(value).ok()
}
