//! Pessimistic exclusive locks with a FIFO wait queue.
//!
//! Each resource is either unlocked or held by one holder, optionally until an
//! expiry time. Expiry is lazy: a lapsed lock stays in the store until the next
//! `check_out` of its resource reaps it, and `query_locks` simply hides it.
//!
//! `check_out` never blocks. A contended request is queued and the caller polls
//! by calling `check_out` again. Releasing a lock does not promote the next
//! waiter; the queue only records who asked first.

mod errors;
mod types;


use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

pub use errors::LockError;
pub use types::{CheckOut, Lock, WaitQueueEntry};

use crate::{
    Result,
    clock::{Clock, SystemClock},
    constants::{LOCK_QUEUE, LOCKS},
    id::ID,
    store::{self, Filter, Store},
};

/// Grants and tracks exclusive locks per resource.
pub struct LockManager {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    /// Serializes every check-then-set sequence against the store.
    guard: Mutex<()>,
}

impl LockManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            guard: Mutex::new(()),
        }
    }

    /// Try to take the lock on `resource` for `holder`.
    ///
    /// - Unlocked (or holding only a lapsed lock): a new lock is granted,
    ///   expiring after `duration` or never, and `holder` leaves the queue.
    /// - Held by `holder`: the existing lock is returned unchanged.
    /// - Held by someone else: `holder` is queued and gets its position, or
    ///   gets [`CheckOut::AlreadyLocked`] if it was queued already.
    ///
    /// A lock counts as lapsed once the clock reaches its expiry, so a zero
    /// `duration` grants a lock that is already lapsed. [`query_locks`] never
    /// reports it and the next `check_out` on the resource removes it.
    ///
    /// [`query_locks`]: Self::query_locks
    pub async fn check_out(
        &self,
        resource: &str,
        holder: &str,
        duration: Option<Duration>,
        reason: Option<String>,
    ) -> Result<CheckOut> {
        let _guard = self.guard.lock().await;
        let now = self.clock.now_millis();

        match self.active_lock(resource, now).await? {
            None => {
                let lock = Lock {
                    id: ID::generate(),
                    resource: resource.to_string(),
                    holder: holder.to_string(),
                    acquired: now,
                    expires: duration.map(|d| now.saturating_add(as_millis(d))),
                    reason,
                };
                self.write_lock(&lock).await?;
                self.dequeue(resource, holder).await?;

                tracing::info!(
                    lock_id = %lock.id,
                    resource,
                    holder,
                    expires = ?lock.expires,
                    "Granted lock"
                );
                Ok(CheckOut::Granted(lock))
            }
            Some(lock) if lock.holder == holder => {
                tracing::debug!(
                    lock_id = %lock.id,
                    resource,
                    holder,
                    "Lock already held by requester"
                );
                Ok(CheckOut::Granted(lock))
            }
            Some(lock) => {
                let queue = self.queue(resource).await?;
                if queue.iter().any(|entry| entry.requester == holder) {
                    return Ok(CheckOut::AlreadyLocked {
                        holder: lock.holder,
                        expires: lock.expires,
                    });
                }

                let entry = WaitQueueEntry {
                    id: ID::generate(),
                    resource: resource.to_string(),
                    requester: holder.to_string(),
                    requested_at: now,
                    sequence: queue.last().map_or(1, |last| last.sequence + 1),
                };
                store::put_as(&*self.store, LOCK_QUEUE, entry.id.as_str(), &entry).await?;

                let position = queue.len() + 1;
                tracing::debug!(
                    resource,
                    requester = holder,
                    current_holder = %lock.holder,
                    position,
                    "Queued lock request"
                );
                Ok(CheckOut::Queued { position })
            }
        }
    }

    /// Release a lock. The next queued requester must call `check_out` itself.
    pub async fn check_in(&self, lock_id: &ID) -> Result<()> {
        let _guard = self.guard.lock().await;
        let lock = self.require(lock_id).await?;
        self.store.del(LOCKS, lock_id.as_str()).await?;

        tracing::info!(
            lock_id = %lock_id,
            resource = %lock.resource,
            holder = %lock.holder,
            "Released lock"
        );
        Ok(())
    }

    /// Administratively remove a lock whoever holds it, returning the previous holder.
    pub async fn break_lock(&self, lock_id: &ID, breaker: &str, reason: &str) -> Result<String> {
        let _guard = self.guard.lock().await;
        let lock = self.require(lock_id).await?;
        self.store.del(LOCKS, lock_id.as_str()).await?;

        tracing::warn!(
            lock_id = %lock_id,
            resource = %lock.resource,
            previous_holder = %lock.holder,
            breaker,
            reason,
            "Lock broken"
        );
        Ok(lock.holder)
    }

    /// Extend a lock by `additional`, counting from now if it has already lapsed.
    ///
    /// Indefinite locks stay indefinite.
    pub async fn renew(&self, lock_id: &ID, additional: Duration) -> Result<Lock> {
        let _guard = self.guard.lock().await;
        let mut lock = self.require(lock_id).await?;
        let now = self.clock.now_millis();

        if let Some(expires) = lock.expires {
            lock.expires = Some(expires.max(now).saturating_add(as_millis(additional)));
            self.write_lock(&lock).await?;
        }

        tracing::debug!(lock_id = %lock_id, expires = ?lock.expires, "Renewed lock");
        Ok(lock)
    }

    /// Unexpired locks, optionally for one resource.
    pub async fn query_locks(&self, resource: Option<&str>) -> Result<Vec<Lock>> {
        let now = self.clock.now_millis();
        let filter = resource.map(|r| Filter::new().eq("resource", r));
        let locks: Vec<Lock> = store::find_as(&*self.store, LOCKS, filter.as_ref()).await?;
        Ok(locks.into_iter().filter(|l| !l.is_expired(now)).collect())
    }

    /// Waiters for `resource`, first requester first.
    pub async fn query_queue(&self, resource: &str) -> Result<Vec<WaitQueueEntry>> {
        self.queue(resource).await
    }

    /// Fetch a lock by id.
    pub async fn get_lock(&self, lock_id: &ID) -> Result<Lock> {
        self.require(lock_id).await
    }

    /// The live lock on `resource`, deleting any lapsed ones found on the way.
    async fn active_lock(&self, resource: &str, now: u64) -> Result<Option<Lock>> {
        let filter = Filter::new().eq("resource", resource);
        let locks: Vec<Lock> = store::find_as(&*self.store, LOCKS, Some(&filter)).await?;

        let mut active = None;
        for lock in locks {
            if lock.is_expired(now) {
                self.store.del(LOCKS, lock.id.as_str()).await?;
                tracing::warn!(
                    lock_id = %lock.id,
                    resource,
                    holder = %lock.holder,
                    "Reaped expired lock"
                );
            } else if active.is_none() {
                active = Some(lock);
            }
        }
        Ok(active)
    }

    async fn queue(&self, resource: &str) -> Result<Vec<WaitQueueEntry>> {
        let filter = Filter::new().eq("resource", resource);
        let mut entries: Vec<WaitQueueEntry> =
            store::find_as(&*self.store, LOCK_QUEUE, Some(&filter)).await?;
        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }

    async fn dequeue(&self, resource: &str, requester: &str) -> Result<()> {
        let filter = Filter::new()
            .eq("resource", resource)
            .eq("requester", requester);
        let entries: Vec<WaitQueueEntry> =
            store::find_as(&*self.store, LOCK_QUEUE, Some(&filter)).await?;
        for entry in entries {
            self.store.del(LOCK_QUEUE, entry.id.as_str()).await?;
        }
        Ok(())
    }

    async fn require(&self, lock_id: &ID) -> Result<Lock> {
        store::get_as(&*self.store, LOCKS, lock_id.as_str())
            .await?
            .ok_or_else(|| {
                LockError::LockNotFound {
                    lock_id: lock_id.clone(),
                }
                .into()
            })
    }

    async fn write_lock(&self, lock: &Lock) -> Result<()> {
        store::put_as(&*self.store, LOCKS, lock.id.as_str(), lock).await
    }
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
