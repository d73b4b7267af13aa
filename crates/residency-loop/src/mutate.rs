//! Generator-parameter mutation (spec §4.4 step 4).
//!
//! "Algorithm selection rotates on stagnation, timeout grows
//! geometrically bounded by a cap, random seed advances" — applied to
//! the pipeline's [`SolverConfig`] between iterations.

use residency_core::{Algorithm, SolverConfig};

const ROTATION: [Algorithm; 4] = [Algorithm::Greedy, Algorithm::CpSat, Algorithm::Ilp, Algorithm::Hybrid];
const TIMEOUT_GROWTH_FACTOR: u64 = 2;

fn next_algorithm(current: Algorithm) -> Algorithm {
    let idx = ROTATION.iter().position(|a| *a == current).unwrap_or(0);
    ROTATION[(idx + 1) % ROTATION.len()]
}

/// Mutates `config` in place for the next iteration. `stagnated` is
/// whether the just-finished iteration failed to strictly improve on the
/// best score; `max_timeout_secs` is the geometric-growth cap.
pub fn mutate(config: &SolverConfig, stagnated: bool, max_timeout_secs: u64) -> SolverConfig {
    let mut next = config.clone();
    if stagnated {
        next = next.with_algorithm(next_algorithm(config.algorithm()));
        let grown = config.timeout_secs().saturating_mul(TIMEOUT_GROWTH_FACTOR);
        next = next.with_timeout_secs(grown.min(max_timeout_secs).max(1));
    }
    next = next.with_seed(config.seed().wrapping_add(1));
    next
}
