//! Error types for the persistence layer.
//!
//! Faults raised here are storage faults: components pass them through
//! unchanged and never retry them.

use thiserror::Error;

/// Errors that can occur while reading or writing records.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record could not be converted to JSON for storage.
    #[error("Serialization failed for {relation}/{id}")]
    SerializationFailed {
        relation: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored record did not have the expected shape.
    #[error("Deserialization failed for record in {relation}")]
    DeserializationFailed {
        relation: String,
        #[source]
        source: serde_json::Error,
    },

    /// Persisting or loading the store file failed.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// The persisted store could not be decoded.
    #[error("Persisted store is invalid")]
    InvalidPersistedState {
        #[source]
        source: serde_json::Error,
    },

    /// Implementation-specific failure of a custom store.
    #[error("Store backend failure: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    /// Check if this error is related to serialization.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::SerializationFailed { .. }
                | StoreError::DeserializationFailed { .. }
                | StoreError::InvalidPersistedState { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Get the relation this error concerns, if any.
    pub fn relation(&self) -> Option<&str> {
        match self {
            StoreError::SerializationFailed { relation, .. }
            | StoreError::DeserializationFailed { relation, .. } => Some(relation),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
