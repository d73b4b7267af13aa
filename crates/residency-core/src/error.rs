//! Error taxonomy shared by the data model and its `Store` abstraction.
//!
//! Mirrors the error families in spec §7: `InvalidInput` maps to
//! [`CoreError::InvalidInvariant`]/[`CoreError::NotFound`], `StoreUnavailable`
//! to [`CoreError::StoreUnavailable`].

use thiserror::Error;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A constructed entity would violate an invariant from spec §3
    /// (e.g. a PGY level outside 1-3, a faculty member with no role tag).
    #[error("invariant violation: {0}")]
    InvalidInvariant(String),

    #[error("entity not found: {0}")]
    NotFound(String),

    /// Two assignments were about to collide on (block, person) — P4.
    #[error("duplicate assignment for block={block} person={person}")]
    DuplicateAssignment { block: String, person: String },

    /// An attempt to overwrite a locked assignment (preload or PCAT/DO sync).
    #[error("assignment {0} is locked and cannot be overwritten")]
    AssignmentLocked(String),

    /// Transient store-layer failure. The accessor's auto-recovery retries
    /// disposal + reconnect up to three times before this becomes fatal.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
