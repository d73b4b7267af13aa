//! Domain-TTL'd cache (spec §5, "Cache").
//!
//! Grounded on the original `CacheManager`'s `CacheConfig`
//! (`default_ttl`, hit/miss/eviction counters). Four named TTL domains
//! cover the scheduling system's read patterns: short-lived utilization
//! snapshots, medium-lived validation reports, long-lived rotation
//! templates, and extended-lived static reference data.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    Short,
    Medium,
    Long,
    Extended,
}

impl CacheTtl {
    pub fn duration(self) -> Duration {
        match self {
            CacheTtl::Short => Duration::from_secs(60),
            CacheTtl::Medium => Duration::from_secs(300),
            CacheTtl::Long => Duration::from_secs(3600),
            CacheTtl::Extended => Duration::from_secs(86_400),
        }
    }
}

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Default)]
struct Stats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

pub struct Cache {
    table: DashMap<String, Entry>,
    stats: Stats,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
            stats: Stats::default(),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: serde_json::Value, ttl: CacheTtl) {
        self.table.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl.duration(),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let live = self
            .table
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone());

        if let Some(value) = live {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Some(value);
        }

        // Either absent or expired; if expired, evict it. The earlier
        // `get` guard is already dropped by this point, so `remove`
        // cannot deadlock against it.
        if self.table.remove(key).is_some() {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Remove every key starting with `prefix`; returns the count removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let keys: Vec<String> = self
            .table
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        for key in &keys {
            self.table.remove(key);
        }
        self.stats.evictions.fetch_add(keys.len() as u64, Ordering::Relaxed);
        keys.len()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hit_and_miss_are_counted() {
        let cache = Cache::new();
        cache.set("utilization:2026-01-01", json!({ "rho": 0.5 }), CacheTtl::Short);
        assert!(cache.get("utilization:2026-01-01").is_some());
        assert!(cache.get("missing").is_none());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn prefix_invalidation_removes_only_matching_keys() {
        let cache = Cache::new();
        cache.set("template:a", json!(1), CacheTtl::Long);
        cache.set("template:b", json!(2), CacheTtl::Long);
        cache.set("run:1", json!(3), CacheTtl::Short);
        let removed = cache.invalidate_prefix("template:");
        assert_eq!(removed, 2);
        assert!(cache.get("run:1").is_some());
        assert!(cache.get("template:a").is_none());
    }

    #[test]
    fn expired_entry_is_evicted_on_access() {
        let cache = Cache::new();
        cache.table.insert(
            "stale".to_string(),
            Entry {
                value: json!(1),
                expires_at: Instant::now() - Duration::from_secs(1),
            },
        );
        assert!(cache.get("stale").is_none());
        assert_eq!(cache.stats().evictions, 1);
    }
}
