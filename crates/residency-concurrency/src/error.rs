//! Error taxonomy for the concurrency primitives (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConcurrencyError {
    #[error("lock '{0}' is held by another owner")]
    LockAcquisitionFailed(String),

    #[error("lock '{0}' is not held by the presented identity token")]
    LockNotHeld(String),

    #[error("idempotency key '{0}' was already used with a different request body")]
    IdempotencyConflict(String),

    #[error("store unavailable after {attempts} reconnect attempts: {reason}")]
    StoreUnavailable { attempts: u32, reason: String },
}

pub type ConcurrencyResult<T> = std::result::Result<T, ConcurrencyError>;
