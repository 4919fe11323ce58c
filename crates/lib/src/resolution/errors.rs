//! Error types for the resolution registry.
//!
//! A strategy failing to merge is not an error: it is reported as
//! [`Resolution::CannotResolve`](super::Resolution::CannotResolve). The variants
//! here cover misuse of the registry itself.

use thiserror::Error;

use crate::id::ID;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A strategy with this name is already registered.
    #[error("Resolution strategy '{name}' is already registered")]
    DuplicateStrategy { name: String },

    /// A strategy produced a merged value it could not encode.
    #[error("Strategy '{strategy}' failed to encode its result: {reason}")]
    EncodingFailed { strategy: String, reason: String },

    /// No conflict record with this id exists.
    #[error("Conflict not found: {conflict_id}")]
    ConflictNotFound { conflict_id: ID },
}

impl ResolutionError {
    /// Check if this error comes from registering strategies.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, ResolutionError::DuplicateStrategy { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionError::ConflictNotFound { .. })
    }

    /// Name of the strategy involved, if any.
    pub fn strategy(&self) -> Option<&str> {
        match self {
            ResolutionError::DuplicateStrategy { name } => Some(name),
            ResolutionError::EncodingFailed { strategy, .. } => Some(strategy),
            ResolutionError::ConflictNotFound { .. } => None,
        }
    }
}

impl From<ResolutionError> for crate::Error {
    fn from(err: ResolutionError) -> Self {
        crate::Error::Resolution(err)
    }
}
