//! Score formula (spec §4.4 step 2).

use crate::config::LoopConfig;
use residency_validator::ValidationReport;

/// `score = w_cov*coverage_rate + w_compliance*compliance_score -
/// w_viol*violation_penalty`.
///
/// `violation_penalty` is a severity-weighted sum with no natural upper
/// bound, so it is squashed through `x/(1+x)` before weighting — this
/// keeps the overall score comparable to the `target_score` without
/// clipping, while preserving monotonicity (more/worse violations always
/// lowers the score).
pub fn score(config: &LoopConfig, report: &ValidationReport) -> f64 {
    let penalty = report.violation_penalty();
    let squashed_penalty = penalty / (1.0 + penalty);
    config.weight_coverage * report.coverage_rate + config.weight_compliance * report.compliance_score()
        - config.weight_violation * squashed_penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_constraints::{Severity, Violation, ViolationKind};

    #[test]
    fn perfect_report_scores_near_weight_sum() {
        let config = LoopConfig::default();
        let report = ValidationReport::new(1.0, vec![]);
        let s = score(&config, &report);
        assert!((s - (config.weight_coverage + config.weight_compliance)).abs() < 1e-9);
    }

    #[test]
    fn more_violations_strictly_lowers_the_score() {
        let config = LoopConfig::default();
        let clean = ValidationReport::new(1.0, vec![]);
        let dirty = ValidationReport::new(
            1.0,
            vec![Violation::new(ViolationKind::WeeklyHoursCeiling, Severity::Critical, "over limit")],
        );
        assert!(score(&config, &dirty) < score(&config, &clean));
    }
}
