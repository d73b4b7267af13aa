//! The loop's resumable state (spec §4.4, "Run persistence").

use crate::config::LoopConfig;
use residency_core::{RunId, SolverConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StopReason {
    TargetReached,
    Exhausted,
    Stagnation,
    TimedOut,
    Cancelled,
}

/// Rehydrated on resume: the next iteration to run, the best score seen
/// so far, the current stagnation streak, and the generator parameters
/// to resume mutating from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopState {
    pub run_id: RunId,
    pub next_iteration: u32,
    pub best_score: f64,
    pub stagnation_counter: u32,
    pub solver_config: SolverConfig,
    pub config: LoopConfig,
    pub stop_reason: Option<StopReason>,
}
