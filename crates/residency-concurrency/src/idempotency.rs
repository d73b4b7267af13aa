//! Idempotency manager (spec §5, "Idempotency").
//!
//! Grounded on the original `IdempotencyManager`
//! (`is_duplicate`/`mark_completed`/`get_cached_result`, default TTL
//! 3600s). A request is identified by its idempotency key; the body is
//! hashed so a second submission under the same key with a different
//! body is rejected as a conflict rather than silently returning the
//! first response (P9).

use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

const DEFAULT_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
struct Entry {
    body_hash: u64,
    result: Option<serde_json::Value>,
    expires_at: Instant,
}

fn hash_body(body: &serde_json::Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    body.to_string().hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, PartialEq)]
pub enum IdempotencyStatus {
    /// No prior submission under this key; the caller should proceed.
    New,
    /// A submission under this key is in flight (no result recorded yet).
    Pending,
    /// A prior submission with the same key and body already completed;
    /// `result` is the cached response.
    Completed(serde_json::Value),
}

pub struct IdempotencyManager {
    table: DashMap<String, Entry>,
    ttl: Duration,
}

impl IdempotencyManager {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            table: DashMap::new(),
            ttl,
        }
    }

    fn live_entry(&self, key: &str) -> Option<Entry> {
        match self.table.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.clone()),
            Some(_) => {
                self.table.remove(key);
                None
            }
            None => None,
        }
    }

    /// P9: checks whether `key`/`body` is new, in-flight, already
    /// completed (returns the cached result), or a conflict (same key,
    /// different body) — the caller distinguishes `Completed` vs a
    /// `None` conflict signal by checking the returned hash.
    pub fn is_duplicate(&self, key: &str, body: &serde_json::Value) -> IdempotencyCheck {
        let hash = hash_body(body);
        match self.live_entry(key) {
            None => {
                self.table.insert(
                    key.to_string(),
                    Entry {
                        body_hash: hash,
                        result: None,
                        expires_at: Instant::now() + self.ttl,
                    },
                );
                IdempotencyCheck::Status(IdempotencyStatus::New)
            }
            Some(entry) if entry.body_hash != hash => IdempotencyCheck::Conflict,
            Some(entry) => IdempotencyCheck::Status(match entry.result {
                Some(result) => IdempotencyStatus::Completed(result),
                None => IdempotencyStatus::Pending,
            }),
        }
    }

    pub fn mark_completed(&self, key: &str, result: serde_json::Value) {
        if let Some(mut entry) = self.table.get_mut(key) {
            entry.result = Some(result);
            entry.expires_at = Instant::now() + self.ttl;
        }
    }

    pub fn get_cached_result(&self, key: &str) -> Option<serde_json::Value> {
        self.live_entry(key).and_then(|e| e.result)
    }
}

impl Default for IdempotencyManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq)]
pub enum IdempotencyCheck {
    Status(IdempotencyStatus),
    Conflict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_key_is_new_then_pending_on_retry() {
        let mgr = IdempotencyManager::new();
        let body = json!({ "run_id": "abc" });
        assert_eq!(mgr.is_duplicate("k1", &body), IdempotencyCheck::Status(IdempotencyStatus::New));
        assert_eq!(mgr.is_duplicate("k1", &body), IdempotencyCheck::Status(IdempotencyStatus::Pending));
    }

    /// P9: same key, identical body, after completion returns the cached
    /// response.
    #[test]
    fn completed_request_returns_cached_result_for_identical_resubmission() {
        let mgr = IdempotencyManager::new();
        let body = json!({ "run_id": "abc" });
        mgr.is_duplicate("k2", &body);
        mgr.mark_completed("k2", json!({ "status": "success" }));
        assert_eq!(
            mgr.is_duplicate("k2", &body),
            IdempotencyCheck::Status(IdempotencyStatus::Completed(json!({ "status": "success" })))
        );
    }

    /// P9: same key, different body, is a conflict.
    #[test]
    fn mismatched_body_under_same_key_is_a_conflict() {
        let mgr = IdempotencyManager::new();
        mgr.is_duplicate("k3", &json!({ "run_id": "abc" }));
        assert_eq!(mgr.is_duplicate("k3", &json!({ "run_id": "xyz" })), IdempotencyCheck::Conflict);
    }
}
