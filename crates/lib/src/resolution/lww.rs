//! Last-Writer-Wins: keep the value carrying the later causal timestamp.

use serde_json::Value;

use super::{Resolution, ResolutionStrategy};
use crate::{
    Result,
    constants::{LWW_NAME, LWW_PRIORITY, TIMESTAMP_MARKER},
};

/// Selects whichever value has the strictly later timestamp.
///
/// A timestamp is read from a JSON object's `_ts` field (integer milliseconds or
/// an RFC3339 string), or from a value that is itself an RFC3339 string. Equal
/// timestamps carry no ordering signal and cannot be resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastWriterWins;

impl ResolutionStrategy for LastWriterWins {
    fn name(&self) -> &str {
        LWW_NAME
    }

    fn priority(&self) -> u32 {
        LWW_PRIORITY
    }

    fn attempt_resolve(
        &self,
        _base: Option<&[u8]>,
        v1: &[u8],
        v2: &[u8],
        _context: &str,
    ) -> Result<Resolution> {
        let (Some(t1), Some(t2)) = (extract_timestamp(v1), extract_timestamp(v2)) else {
            return Ok(Resolution::cannot(
                "Unable to extract causal timestamps from one or both values",
            ));
        };

        if t1 == t2 {
            return Ok(Resolution::cannot(
                "Timestamps are identical; concurrent writes have no ordering",
            ));
        }

        let winner = if t1 > t2 { v1 } else { v2 };
        Ok(Resolution::Resolved(winner.to_vec()))
    }
}

/// Extract a causal timestamp, in milliseconds, from a value.
pub fn extract_timestamp(value: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(value).ok()?;

    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        match &parsed {
            Value::Object(map) => {
                return match map.get(TIMESTAMP_MARKER)? {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => parse_rfc3339(s),
                    _ => None,
                };
            }
            Value::String(s) => return parse_rfc3339(s),
            _ => {}
        }
    }

    parse_rfc3339(text.trim())
}

fn parse_rfc3339(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
