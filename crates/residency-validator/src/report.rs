//! The validator's output object (spec §4.3, §6 "Violation report").

use residency_constraints::Violation;
use residency_core::PersonId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `{compliance, coverage rate, total violations, per-person violation
/// lists}` (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub compliance: bool,
    pub coverage_rate: f64,
    pub total_violations: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(coverage_rate: f64, violations: Vec<Violation>) -> Self {
        let compliance = violations
            .iter()
            .all(|v| !matches!(v.severity, residency_constraints::Severity::Critical | residency_constraints::Severity::High));
        Self {
            compliance,
            coverage_rate,
            total_violations: violations.len(),
            violations,
        }
    }

    /// Violations grouped by the person they concern; violations with no
    /// person attribution (system-wide) are omitted.
    pub fn by_person(&self) -> HashMap<PersonId, Vec<&Violation>> {
        let mut map: HashMap<PersonId, Vec<&Violation>> = HashMap::new();
        for v in &self.violations {
            if let Some(p) = v.person {
                map.entry(p).or_default().push(v);
            }
        }
        map
    }

    /// Severity-weighted total used by the loop's scoring formula (§4.4).
    pub fn violation_penalty(&self) -> f64 {
        residency_constraints::violation_penalty(&self.violations)
    }

    /// Fraction of ACGME rule families with zero violations, used as the
    /// loop score's `compliance_score` term.
    pub fn compliance_score(&self) -> f64 {
        if self.violations.is_empty() {
            1.0
        } else {
            let critical_or_high = self
                .violations
                .iter()
                .filter(|v| {
                    matches!(
                        v.severity,
                        residency_constraints::Severity::Critical | residency_constraints::Severity::High
                    )
                })
                .count();
            1.0 - (critical_or_high as f64 / self.violations.len() as f64)
        }
    }
}
