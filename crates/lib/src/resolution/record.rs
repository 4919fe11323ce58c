//! Stored audit trail of successful resolutions.

use serde::{Deserialize, Serialize};

use crate::id::ID;

/// Audit entry for one successful resolution.
///
/// Records are purely observational. Dispatch never reads them back, so
/// repeating a resolution writes a fresh record each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub id: ID,
    /// Name of the strategy that produced `result`.
    pub strategy: String,
    #[serde(with = "serde_bytes", default)]
    pub base: Option<Vec<u8>>,
    #[serde(with = "serde_bytes")]
    pub v1: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub v2: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub result: Vec<u8>,
    pub context: String,
    /// RFC3339 timestamp from the registry's clock.
    pub resolved_at: String,
}
