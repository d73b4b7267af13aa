//! Per-iteration history record (spec §4.4 step 5, §6 "history").

use chrono::{DateTime, Utc};
use residency_core::{Algorithm, RunStatus};
use serde::{Deserialize, Serialize};

/// One line of the append-only `history` log — one per iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub recorded_at: DateTime<Utc>,
    pub status: RunStatus,
    pub algorithm: Algorithm,
    pub timeout_secs: u64,
    pub seed: u64,
    pub coverage_rate: f64,
    pub compliance_score: f64,
    pub violation_penalty: f64,
    pub score: f64,
    pub is_best_so_far: bool,
    pub stagnation_counter: u32,
}
