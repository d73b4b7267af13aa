//! Loop configuration (spec §4.4, "Loop configuration").

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `max-iterations`, `target-score`, `stagnation-limit`, `time-limit`,
/// `candidates-per-iteration`, plus the score-formula weights (spec
/// §4.4: `score = w_cov*coverage_rate + w_compliance*compliance_score -
/// w_viol*violation_penalty`, weights sum to 1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoopConfig {
    pub max_iterations: u32,
    pub target_score: f64,
    pub stagnation_limit: u32,
    #[serde(with = "duration_secs")]
    pub time_limit: Duration,
    pub candidates_per_iteration: u32,
    pub weight_coverage: f64,
    pub weight_compliance: f64,
    pub weight_violation: f64,
    /// The minimum strict improvement that resets the stagnation counter.
    pub epsilon: f64,
    /// Upper bound the geometric timeout-growth mutation is clamped to.
    pub max_timeout_secs: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            target_score: 0.95,
            stagnation_limit: 8,
            time_limit: Duration::from_secs(300),
            candidates_per_iteration: 1,
            weight_coverage: 0.5,
            weight_compliance: 0.4,
            weight_violation: 0.1,
            epsilon: 1e-6,
            max_timeout_secs: 300,
        }
    }
}

impl LoopConfig {
    /// Panics are inappropriate here (this is caller-supplied config, not
    /// a programmer invariant), so invalid weights are normalized rather
    /// than rejected: the score formula requires they sum to 1.
    pub fn normalized(mut self) -> Self {
        let sum = self.weight_coverage + self.weight_compliance + self.weight_violation;
        if sum > 0.0 && (sum - 1.0).abs() > 1e-9 {
            self.weight_coverage /= sum;
            self.weight_compliance /= sum;
            self.weight_violation /= sum;
        }
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unequal_weights_are_normalized_to_sum_one() {
        let cfg = LoopConfig {
            weight_coverage: 1.0,
            weight_compliance: 1.0,
            weight_violation: 2.0,
            ..LoopConfig::default()
        }
        .normalized();
        let sum = cfg.weight_coverage + cfg.weight_compliance + cfg.weight_violation;
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
