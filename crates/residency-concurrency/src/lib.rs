//! Concurrency & resource primitives (spec §5): a cooperative
//! cancellation token, a distributed lock, an idempotency manager, a
//! domain-TTL'd cache, and a connection pool monitor. The Pipeline and
//! Loop run single-threaded per invocation; the Resilience engine runs
//! as a background actor polling these primitives at its tick boundary.

pub mod cache;
pub mod cancel;
pub mod error;
pub mod idempotency;
pub mod lock;
pub mod pool;

pub use cache::{Cache, CacheStatsSnapshot, CacheTtl};
pub use cancel::CancelToken;
pub use error::{ConcurrencyError, ConcurrencyResult};
pub use idempotency::{IdempotencyCheck, IdempotencyManager, IdempotencyStatus};
pub use lock::{DistributedLock, InMemoryLockStore, LockHandle, LockStore};
pub use pool::{PoolCheckout, PoolConfig, PoolMonitor, PoolSnapshot};
