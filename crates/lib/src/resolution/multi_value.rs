//! Multi-Value: keep every concurrent write.

use serde_json::Value;

use super::{Resolution, ResolutionError, ResolutionStrategy};
use crate::{
    Result,
    constants::{MULTI_VALUE_NAME, MULTI_VALUE_PRIORITY},
};

/// Keeps both values as a sorted pair, encoded as a JSON array.
///
/// Never fails, so it acts as the last resort of a default registry. UTF-8
/// values are encoded as JSON strings and anything else as an array of byte
/// values. Identical inputs resolve to that value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiValue;

impl ResolutionStrategy for MultiValue {
    fn name(&self) -> &str {
        MULTI_VALUE_NAME
    }

    fn priority(&self) -> u32 {
        MULTI_VALUE_PRIORITY
    }

    fn attempt_resolve(
        &self,
        _base: Option<&[u8]>,
        v1: &[u8],
        v2: &[u8],
        _context: &str,
    ) -> Result<Resolution> {
        if v1 == v2 {
            return Ok(Resolution::Resolved(v1.to_vec()));
        }

        let (first, second) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
        let pair = Value::Array(vec![encode(first), encode(second)]);
        let merged = serde_json::to_vec(&pair).map_err(|e| ResolutionError::EncodingFailed {
            strategy: MULTI_VALUE_NAME.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Resolution::Resolved(merged))
    }
}

fn encode(value: &[u8]) -> Value {
    match std::str::from_utf8(value) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => Value::Array(value.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// Split a merged pair produced by [`MultiValue`] back into its two values.
pub fn decode_pair(merged: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let Value::Array(items) = serde_json::from_slice::<Value>(merged).ok()? else {
        return None;
    };
    let [first, second] = <[Value; 2]>::try_from(items).ok()?;
    Some((decode(first)?, decode(second)?))
}

fn decode(value: Value) -> Option<Vec<u8>> {
    match value {
        Value::String(text) => Some(text.into_bytes()),
        Value::Array(bytes) => bytes
            .into_iter()
            .map(|b| b.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}
