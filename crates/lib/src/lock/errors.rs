//! Lock manager error types.
//!
//! Contention is not an error: [`CheckOut::Queued`](super::CheckOut::Queued)
//! and [`CheckOut::AlreadyLocked`](super::CheckOut::AlreadyLocked) are regular
//! outcomes of `check_out`.

use thiserror::Error;

use crate::id::ID;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LockError {
    /// No lock with this id exists. It was never granted, or has already been
    /// released, broken, or reaped after expiring.
    #[error("Lock not found: {lock_id}")]
    LockNotFound { lock_id: ID },
}

impl LockError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LockError::LockNotFound { .. })
    }

    pub fn lock_id(&self) -> &ID {
        match self {
            LockError::LockNotFound { lock_id } => lock_id,
        }
    }
}

impl From<LockError> for crate::Error {
    fn from(err: LockError) -> Self {
        crate::Error::Lock(err)
    }
}
