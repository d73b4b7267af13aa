//! Connection pool monitor (spec §5, "Connection pool monitor"; §7
//! "StoreUnavailable auto-recovery").
//!
//! Grounded verbatim on the original `app/db/pool/monitoring.py`
//! dataclasses for the snapshot fields. The pool itself is a stub
//! counter structure — no real database driver, per the persistence
//! Non-goal — that the health pre-ping/recycle/auto-recovery logic
//! below exercises and updates.

use crate::error::{ConcurrencyError, ConcurrencyResult};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub size: usize,
    pub max_overflow: usize,
    pub recycle: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 10,
            max_overflow: 5,
            recycle: Duration::from_secs(3600),
        }
    }
}

/// `{size, checked_in, checked_out, overflow, total_connections,
/// utilization, total_checkouts, avg_checkout_duration,
/// peak_connections}` (spec §5).
#[derive(Debug, Clone, Copy)]
pub struct PoolSnapshot {
    pub size: usize,
    pub checked_in: usize,
    pub checked_out: usize,
    pub overflow: usize,
    pub total_connections: usize,
    pub utilization: f64,
    pub total_checkouts: u64,
    pub avg_checkout_duration: Duration,
    pub peak_connections: usize,
}

struct PoolInner {
    checked_out: usize,
    total_checkouts: u64,
    checkout_duration_sum: Duration,
    peak_connections: usize,
    consecutive_failures: u32,
}

pub struct PoolMonitor {
    config: PoolConfig,
    inner: Mutex<PoolInner>,
}

pub struct PoolCheckout<'a> {
    monitor: &'a PoolMonitor,
    started_at: Instant,
    returned: bool,
}

impl PoolMonitor {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(PoolInner {
                checked_out: 0,
                total_checkouts: 0,
                checkout_duration_sum: Duration::ZERO,
                peak_connections: 0,
                consecutive_failures: 0,
            }),
        }
    }

    pub fn checkout(&self) -> ConcurrencyResult<PoolCheckout<'_>> {
        let mut inner = self.inner.lock();
        if inner.checked_out >= self.config.size + self.config.max_overflow {
            return Err(ConcurrencyError::LockAcquisitionFailed(
                "connection pool exhausted".into(),
            ));
        }
        inner.checked_out += 1;
        inner.total_checkouts += 1;
        inner.peak_connections = inner.peak_connections.max(inner.checked_out);
        Ok(PoolCheckout {
            monitor: self,
            started_at: Instant::now(),
            returned: false,
        })
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let inner = self.inner.lock();
        let total_connections = self.config.size;
        let overflow = inner.checked_out.saturating_sub(self.config.size);
        let checked_in = total_connections.saturating_sub(inner.checked_out.min(total_connections));
        let utilization = if total_connections == 0 {
            0.0
        } else {
            inner.checked_out as f64 / (total_connections + self.config.max_overflow) as f64
        };
        let avg_checkout_duration = if inner.total_checkouts == 0 {
            Duration::ZERO
        } else {
            inner.checkout_duration_sum / inner.total_checkouts as u32
        };
        PoolSnapshot {
            size: self.config.size,
            checked_in,
            checked_out: inner.checked_out,
            overflow,
            total_connections,
            utilization,
            total_checkouts: inner.total_checkouts,
            avg_checkout_duration,
            peak_connections: inner.peak_connections,
        }
    }

    /// A liveness probe before handing out a connection. Returns whether
    /// the (stubbed) backend answered; a failed ping increments the
    /// consecutive-failure counter consumed by [`Self::auto_recover`].
    pub fn health_pre_ping(&self, healthy: bool) -> bool {
        let mut inner = self.inner.lock();
        if healthy {
            inner.consecutive_failures = 0;
        } else {
            inner.consecutive_failures += 1;
        }
        healthy
    }

    /// Drop and recreate the pool's connections (stub: resets counters).
    pub fn recycle(&self) {
        let mut inner = self.inner.lock();
        inner.checked_out = 0;
        inner.peak_connections = 0;
    }

    /// Retries `reconnect` up to three times, per §7's "auto-recovery
    /// attempts disposal + reconnect up to three times".
    pub async fn auto_recover<F, Fut>(&self, mut reconnect: F) -> ConcurrencyResult<()>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<(), String>>,
    {
        const MAX_ATTEMPTS: u32 = 3;
        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            self.recycle();
            match reconnect().await {
                Ok(()) => {
                    self.inner.lock().consecutive_failures = 0;
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "pool auto-recovery attempt failed");
                    last_error = e;
                }
            }
        }
        Err(ConcurrencyError::StoreUnavailable {
            attempts: MAX_ATTEMPTS,
            reason: last_error,
        })
    }
}

impl Drop for PoolCheckout<'_> {
    fn drop(&mut self) {
        if !self.returned {
            let elapsed = self.started_at.elapsed();
            let mut inner = self.monitor.inner.lock();
            inner.checked_out = inner.checked_out.saturating_sub(1);
            inner.checkout_duration_sum += elapsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_increments_and_drop_decrements_checked_out() {
        let pool = PoolMonitor::new(PoolConfig::default());
        {
            let _c = pool.checkout().unwrap();
            assert_eq!(pool.snapshot().checked_out, 1);
        }
        assert_eq!(pool.snapshot().checked_out, 0);
    }

    #[test]
    fn exhausted_pool_rejects_further_checkouts() {
        let pool = PoolMonitor::new(PoolConfig {
            size: 1,
            max_overflow: 0,
            recycle: Duration::from_secs(60),
        });
        let _first = pool.checkout().unwrap();
        assert!(pool.checkout().is_err());
    }

    #[tokio::test]
    async fn auto_recover_succeeds_within_three_attempts() {
        let pool = PoolMonitor::new(PoolConfig::default());
        let attempts = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        let result = pool
            .auto_recover(move || {
                let attempts = attempts_clone.clone();
                async move {
                    let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    if n < 2 {
                        Err("connection refused".to_string())
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn auto_recover_gives_up_after_three_failures() {
        let pool = PoolMonitor::new(PoolConfig::default());
        let result = pool.auto_recover(|| async { Err("down".to_string()) }).await;
        assert!(matches!(result, Err(ConcurrencyError::StoreUnavailable { attempts: 3, .. })));
    }
}
