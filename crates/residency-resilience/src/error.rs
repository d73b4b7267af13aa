//! Error taxonomy for the resilience & homeostasis engine (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResilienceError {
    #[error(transparent)]
    Pipeline(#[from] residency_pipeline::PipelineError),

    #[error("no fallback registered for scenario tag '{0}'")]
    UnknownFallbackScenario(String),

    #[error("fallback '{0}' is already active")]
    FallbackAlreadyActive(String),

    #[error("fallback '{0}' is not active")]
    FallbackNotActive(String),
}

pub type ResilienceResult<T> = std::result::Result<T, ResilienceError>;
