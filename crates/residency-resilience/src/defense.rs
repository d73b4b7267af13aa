//! Defense-in-Depth ladder (spec §4.5.2): a deterministic mapping from
//! observed stress signals onto one of five postures, in ascending
//! order of how much of the system is actively compensating.

use crate::utilization::utilization_level;
use residency_core::{DefenseLevel, UtilizationLevel};

/// Derive the active defense posture from the utilization tier, the N-1/N-2
/// contingency results, and whether a pre-computed fallback is live.
///
/// `Prevention` is the default, always-on posture (routine monitoring).
/// Each subsequent tier activates on a strictly worse signal than the one
/// before it, so the function never needs to "downgrade" — callers derive
/// the level fresh on every tick rather than tracking hysteresis here.
pub fn defense_level(
    utilization: UtilizationLevel,
    n1_pass: bool,
    n2_pass: bool,
    fallback_active: bool,
) -> DefenseLevel {
    if utilization == UtilizationLevel::Black || (!n1_pass && !n2_pass) {
        return DefenseLevel::Emergency;
    }
    if fallback_active || utilization == UtilizationLevel::Red {
        return DefenseLevel::Containment;
    }
    if !n1_pass || utilization == UtilizationLevel::Orange {
        return DefenseLevel::SafetySystems;
    }
    if utilization == UtilizationLevel::Yellow {
        return DefenseLevel::Control;
    }
    DefenseLevel::Prevention
}

/// Map a utilization tier onto the load-shedding tier that should be in
/// effect absent any other pressure (§4.5.4 ties shedding to utilization
/// by default; contingency failures or an active fallback can still push
/// shedding higher via the tick actor).
pub fn baseline_shedding_level(utilization: UtilizationLevel) -> residency_core::LoadSheddingLevel {
    use residency_core::LoadSheddingLevel::*;
    match utilization {
        UtilizationLevel::Green => Normal,
        UtilizationLevel::Yellow => Yellow,
        UtilizationLevel::Orange => Orange,
        UtilizationLevel::Red => Red,
        UtilizationLevel::Black => Black,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_utilization_always_forces_emergency() {
        assert_eq!(
            defense_level(UtilizationLevel::Black, true, true, false),
            DefenseLevel::Emergency
        );
    }

    #[test]
    fn failing_both_contingency_checks_forces_emergency_regardless_of_utilization() {
        assert_eq!(
            defense_level(UtilizationLevel::Green, false, false, false),
            DefenseLevel::Emergency
        );
    }

    #[test]
    fn green_utilization_with_clean_contingency_is_prevention() {
        assert_eq!(
            defense_level(UtilizationLevel::Green, true, true, false),
            DefenseLevel::Prevention
        );
    }

    #[test]
    fn active_fallback_forces_at_least_containment() {
        assert_eq!(
            defense_level(UtilizationLevel::Green, true, true, true),
            DefenseLevel::Containment
        );
    }

    #[test]
    fn utilization_level_threshold_matches_defense_mapping_inputs() {
        assert_eq!(utilization_level(0.99), UtilizationLevel::Black);
        assert_eq!(utilization_level(0.5), UtilizationLevel::Green);
    }
}
