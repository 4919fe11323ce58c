//! Stored lock state and check-out outcomes.

use serde::{Deserialize, Serialize};

use crate::id::ID;

/// An exclusive grant on one resource.
///
/// Times are epoch milliseconds from the manager's clock. A lock without
/// `expires` is held until it is checked in or broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub id: ID,
    pub resource: String,
    pub holder: String,
    pub acquired: u64,
    #[serde(default)]
    pub expires: Option<u64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Lock {
    /// Whether the lock has lapsed at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires.is_some_and(|expires| now >= expires)
    }

    pub fn is_indefinite(&self) -> bool {
        self.expires.is_none()
    }
}

/// A requester waiting for a locked resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitQueueEntry {
    pub id: ID,
    pub resource: String,
    pub requester: String,
    pub requested_at: u64,
    /// Per-resource insertion counter; queue order is ascending `sequence`.
    pub sequence: u64,
}

/// Outcome of [`LockManager::check_out`](super::LockManager::check_out).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOut {
    /// The caller holds the lock, either newly granted or already held.
    Granted(Lock),
    /// The resource is held by someone else; the caller was added to the
    /// wait queue at this 1-based position.
    Queued { position: usize },
    /// The resource is held by someone else and the caller is already queued.
    AlreadyLocked {
        holder: String,
        expires: Option<u64>,
    },
}

impl CheckOut {
    pub fn is_granted(&self) -> bool {
        matches!(self, CheckOut::Granted(_))
    }

    /// The granted lock, if any.
    pub fn lock(&self) -> Option<&Lock> {
        match self {
            CheckOut::Granted(lock) => Some(lock),
            _ => None,
        }
    }
}
