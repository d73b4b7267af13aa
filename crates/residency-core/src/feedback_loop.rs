//! FeedbackLoop entity: a named control loop with a setpoint, value
//! history, and correction count (spec §3, §4.6).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A target value with an acceptable tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    pub target: f64,
    pub tolerance: f64,
}

impl Setpoint {
    pub fn new(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }

    /// Whether `value` falls within the tolerance band around the target.
    pub fn within_tolerance(&self, value: f64) -> bool {
        (value - self.target).abs() <= self.tolerance
    }

    pub fn deviation(&self, value: f64) -> f64 {
        value - self.target
    }
}

const DEFAULT_HISTORY_CAPACITY: usize = 28;

/// A named feedback loop: coverage-rate, faculty-utilization,
/// workload-balance, schedule-stability, or acgme-compliance (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackLoop {
    name: String,
    setpoint: Setpoint,
    history: VecDeque<f64>,
    history_capacity: usize,
    consecutive_deviations: u32,
    correction_count: u32,
}

impl FeedbackLoop {
    pub fn new(name: impl Into<String>, setpoint: Setpoint) -> Self {
        Self {
            name: name.into(),
            setpoint,
            history: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            consecutive_deviations: 0,
            correction_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn setpoint(&self) -> Setpoint {
        self.setpoint
    }

    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    pub fn consecutive_deviations(&self) -> u32 {
        self.consecutive_deviations
    }

    pub fn correction_count(&self) -> u32 {
        self.correction_count
    }

    /// Record a new observation, update the deviation streak, and report
    /// whether this observation deviated from the setpoint's tolerance.
    pub fn observe(&mut self, value: f64) -> bool {
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(value);

        let deviated = !self.setpoint.within_tolerance(value);
        if deviated {
            self.consecutive_deviations += 1;
        } else {
            self.consecutive_deviations = 0;
        }
        deviated
    }

    pub fn record_correction(&mut self) {
        self.correction_count += 1;
        self.consecutive_deviations = 0;
    }

    pub fn latest(&self) -> Option<f64> {
        self.history.back().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_streak_resets_on_in_tolerance_observation() {
        let mut fl = FeedbackLoop::new("coverage-rate", Setpoint::new(0.95, 0.05));
        assert!(fl.observe(0.70)); // deviated
        assert!(fl.observe(0.71)); // deviated
        assert_eq!(fl.consecutive_deviations(), 2);
        assert!(!fl.observe(0.96)); // in tolerance
        assert_eq!(fl.consecutive_deviations(), 0);
    }

    #[test]
    fn history_capacity_bounds_the_window() {
        let mut fl = FeedbackLoop::new("faculty-utilization", Setpoint::new(0.75, 0.10));
        for i in 0..40 {
            fl.observe(i as f64 * 0.01);
        }
        assert_eq!(fl.history().len(), DEFAULT_HISTORY_CAPACITY);
    }
}
