//! Distributed lock (spec §5, "Distributed lock").
//!
//! Grounded on the original Python `DistributedLock` (Redis `SET NX EX` +
//! a Lua compare-and-delete script) semantics: `acquire` returns a
//! [`LockHandle`] carrying a random per-acquisition identity token;
//! `release`/`extend` only succeed if the caller's token matches the
//! currently-stored one (P8). Reimplemented here as an in-process,
//! trait-abstracted [`LockStore`] so the crate carries no network
//! dependency, consistent with the persistence Non-goal — a real Redis
//! backend would implement the same trait.

use crate::error::{ConcurrencyError, ConcurrencyResult};
use dashmap::DashMap;
use rand::RngCore;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct LockEntry {
    token: u128,
    expires_at: Instant,
}

/// Storage seam for the lock table. The in-process [`InMemoryLockStore`]
/// is the reference implementation; a Redis-backed store would implement
/// the same trait with `SET NX EX` / a compare-and-delete Lua script.
pub trait LockStore: Send + Sync {
    fn try_acquire(&self, key: &str, token: u128, ttl: Duration) -> bool;
    fn release(&self, key: &str, token: u128) -> bool;
    fn extend(&self, key: &str, token: u128, ttl: Duration) -> bool;
}

#[derive(Default)]
pub struct InMemoryLockStore {
    table: DashMap<String, LockEntry>,
}

impl InMemoryLockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn expired(entry: &LockEntry) -> bool {
        Instant::now() >= entry.expires_at
    }
}

impl LockStore for InMemoryLockStore {
    fn try_acquire(&self, key: &str, token: u128, ttl: Duration) -> bool {
        match self.table.get(key) {
            Some(entry) if !Self::expired(&entry) => false,
            _ => {
                self.table.insert(
                    key.to_string(),
                    LockEntry {
                        token,
                        expires_at: Instant::now() + ttl,
                    },
                );
                true
            }
        }
    }

    fn release(&self, key: &str, token: u128) -> bool {
        match self.table.get(key) {
            Some(entry) if entry.token == token && !Self::expired(&entry) => {
                drop(entry);
                self.table.remove(key);
                true
            }
            _ => false,
        }
    }

    fn extend(&self, key: &str, token: u128, ttl: Duration) -> bool {
        match self.table.get_mut(key) {
            Some(mut entry) if entry.token == token && !Self::expired(&entry) => {
                entry.expires_at = Instant::now() + ttl;
                true
            }
            _ => false,
        }
    }
}

/// A held lock. Dropping the handle does NOT release the lock (the TTL
/// is the only automatic expiry) — call [`LockHandle::release`]
/// explicitly, matching the original's non-RAII Redis client semantics.
pub struct LockHandle {
    key: String,
    token: u128,
    store: Arc<dyn LockStore>,
}

impl LockHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// P8: only succeeds if this handle's token still matches the store.
    pub fn release(&self) -> ConcurrencyResult<()> {
        if self.store.release(&self.key, self.token) {
            Ok(())
        } else {
            Err(ConcurrencyError::LockNotHeld(self.key.clone()))
        }
    }

    pub fn extend(&self, ttl: Duration) -> ConcurrencyResult<()> {
        if self.store.extend(&self.key, self.token, ttl) {
            Ok(())
        } else {
            Err(ConcurrencyError::LockNotHeld(self.key.clone()))
        }
    }
}

pub struct DistributedLock {
    store: Arc<dyn LockStore>,
}

impl DistributedLock {
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self { store }
    }

    /// Poll for the lock until `timeout` elapses.
    pub async fn acquire(
        &self,
        key: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> ConcurrencyResult<LockHandle> {
        let token = rand::thread_rng().next_u64() as u128 | ((rand::thread_rng().next_u64() as u128) << 64);
        let deadline = Instant::now() + timeout;
        loop {
            if self.store.try_acquire(key, token, ttl) {
                return Ok(LockHandle {
                    key: key.to_string(),
                    token,
                    store: self.store.clone(),
                });
            }
            if Instant::now() >= deadline {
                return Err(ConcurrencyError::LockAcquisitionFailed(key.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_fails_while_first_is_held() {
        let lock = DistributedLock::new(InMemoryLockStore::new());
        let handle = lock
            .acquire("residency:run:1", Duration::from_secs(5), Duration::from_millis(50))
            .await
            .unwrap();
        let second = lock
            .acquire("residency:run:1", Duration::from_secs(5), Duration::from_millis(50))
            .await;
        assert!(second.is_err());
        handle.release().unwrap();
    }

    /// P8: a release with a mismatched identity token must not remove
    /// the lock.
    #[tokio::test]
    async fn release_with_wrong_token_does_not_remove_lock() {
        let store = InMemoryLockStore::new();
        let lock = DistributedLock::new(store.clone());
        let handle = lock
            .acquire("residency:run:2", Duration::from_secs(5), Duration::from_millis(50))
            .await
            .unwrap();

        let forged = LockHandle {
            key: handle.key().to_string(),
            token: handle.token.wrapping_add(1),
            store: store.clone(),
        };
        assert!(forged.release().is_err());

        // The genuine handle can still release it.
        assert!(handle.release().is_ok());
    }

    #[tokio::test]
    async fn ttl_expiry_lets_a_new_owner_acquire() {
        let lock = DistributedLock::new(InMemoryLockStore::new());
        let _handle = lock
            .acquire("residency:run:3", Duration::from_millis(20), Duration::from_millis(50))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let reacquired = lock
            .acquire("residency:run:3", Duration::from_secs(5), Duration::from_millis(50))
            .await;
        assert!(reacquired.is_ok());
    }
}
