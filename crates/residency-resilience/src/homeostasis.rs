//! Homeostasis Service (spec §4.6): five named feedback loops with fixed
//! setpoints, an allostatic-load score, automatic correction-firing, and
//! positive-feedback-loop risk detection, rolled up into one system-level
//! allostasis classification.
//!
//! Built on `residency_core::FeedbackLoop`/`Setpoint` — those types carry
//! the observation history and deviation-streak bookkeeping; this module
//! supplies the five setpoints spec §4.6 names plus the cross-loop
//! reasoning (allostatic load, correction-firing, positive-feedback risk)
//! spec §4.6 describes but the data model alone doesn't implement.
//!
//! The original Python `app/resilience/homeostasis.py` (the file spec
//! §4.6's `HomeostasisService` name and the five setpoints' target/
//! tolerance values are grounded on) delegates its actual risk-detection
//! and allostatic-load algorithms to `app.resilience.homeostasis` and
//! `app.resilience.service` — neither module is present in the filtered
//! corpus, so the algorithms below are built fresh from spec §4.6's own
//! prose ("chains of corrections where one correction demonstrably
//! worsens another loop's deviation", "allostatic-load score (cumulative
//! stress)", "fires a correction action when the counter crosses a
//! configured threshold"), not translated from any corpus source.

use chrono::{DateTime, Utc};
use residency_core::{PositiveFeedbackRisk, RiskSeverity};
use std::collections::HashMap;
use uuid::Uuid;

use residency_core::{FeedbackLoop, Setpoint};

pub const COVERAGE_RATE: &str = "coverage-rate";
pub const FACULTY_UTILIZATION: &str = "faculty-utilization";
pub const WORKLOAD_BALANCE: &str = "workload-balance";
pub const SCHEDULE_STABILITY: &str = "schedule-stability";
pub const ACGME_COMPLIANCE: &str = "acgme-compliance";

/// Consecutive-deviation streak at which the service fires a correction
/// automatically (spec §4.6, "fires a correction action when the counter
/// crosses a configured threshold").
const CORRECTION_THRESHOLD: u32 = 3;

/// Consecutive-deviation streak past which a loop that has already had a
/// correction fired is treated as overloaded — the correction didn't
/// hold (spec §4.6, "sustained deviation despite correction attempts").
const OVERLOAD_STREAK: u32 = 3;

/// Per-observation stress contribution is the deviation magnitude
/// relative to the setpoint's tolerance band; load decays by this much
/// on every in-tolerance observation, any loop.
const ALLOSTATIC_DECAY: f64 = 0.02;

/// Allostasis classification, named after the original model's own
/// vocabulary: steady state, actively compensating, or compensating
/// mechanisms themselves breaking down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllostasisState {
    Homeostasis,
    Compensated,
    AllostaticOverload,
}

/// Snapshot of every other loop's deviation magnitude taken at the
/// moment a correction fires against `trigger`, used to tell whether a
/// later observation on one of those loops got worse as a side effect.
struct CorrectionSnapshot {
    trigger: &'static str,
    baseline: HashMap<&'static str, f64>,
}

pub struct HomeostasisService {
    loops: HashMap<&'static str, FeedbackLoop>,
    allostatic_load: f64,
    last_correction: Option<CorrectionSnapshot>,
    positive_feedback_risks: Vec<PositiveFeedbackRisk>,
}

impl Default for HomeostasisService {
    fn default() -> Self {
        let mut loops = HashMap::new();
        loops.insert(COVERAGE_RATE, FeedbackLoop::new(COVERAGE_RATE, Setpoint::new(0.95, 0.05)));
        loops.insert(
            FACULTY_UTILIZATION,
            FeedbackLoop::new(FACULTY_UTILIZATION, Setpoint::new(0.75, 0.10)),
        );
        loops.insert(
            WORKLOAD_BALANCE,
            FeedbackLoop::new(WORKLOAD_BALANCE, Setpoint::new(0.15, 0.05)),
        );
        loops.insert(
            SCHEDULE_STABILITY,
            FeedbackLoop::new(SCHEDULE_STABILITY, Setpoint::new(0.95, 0.05)),
        );
        loops.insert(
            ACGME_COMPLIANCE,
            FeedbackLoop::new(ACGME_COMPLIANCE, Setpoint::new(1.0, 0.02)),
        );
        Self {
            loops,
            allostatic_load: 0.0,
            last_correction: None,
            positive_feedback_risks: Vec::new(),
        }
    }
}

impl HomeostasisService {
    pub fn new() -> Self {
        Self::default()
    }

    fn deviation_magnitude(&self, name: &str, value: f64) -> f64 {
        self.loops
            .get(name)
            .map(|l| l.setpoint().deviation(value).abs())
            .unwrap_or(0.0)
    }

    /// Record an observation against the named loop: updates the
    /// deviation streak, the allostatic-load score, fires a correction if
    /// the streak just crossed [`CORRECTION_THRESHOLD`], and checks
    /// whether this observation is a positive-feedback consequence of the
    /// most recent correction fired against a *different* loop. Returns
    /// whether this observation deviated from its setpoint's tolerance.
    pub fn observe(&mut self, name: &'static str, value: f64, now: DateTime<Utc>) -> bool {
        let magnitude_before = self.deviation_magnitude(name, value);
        let deviated = self
            .loops
            .get_mut(name)
            .map(|l| l.observe(value))
            .unwrap_or_else(|| panic!("unknown feedback loop '{name}'"));

        if deviated {
            self.allostatic_load += magnitude_before;
        } else {
            self.allostatic_load = (self.allostatic_load - ALLOSTATIC_DECAY).max(0.0);
        }

        self.detect_positive_feedback(name, magnitude_before, now);

        let streak = self.loops.get(name).expect("known loop").consecutive_deviations();
        if deviated && streak == CORRECTION_THRESHOLD {
            self.fire_correction(name);
        }

        deviated
    }

    /// If the last correction fired against some other loop and this
    /// loop's deviation has worsened relative to the baseline snapshot
    /// taken at that moment, raise a [`PositiveFeedbackRisk`].
    fn detect_positive_feedback(&mut self, name: &'static str, magnitude_now: f64, now: DateTime<Utc>) {
        let Some(snapshot) = &self.last_correction else {
            return;
        };
        if snapshot.trigger == name {
            return;
        }
        let Some(&baseline) = snapshot.baseline.get(name) else {
            return;
        };
        if magnitude_now <= baseline {
            return;
        }
        let worsening = magnitude_now - baseline;
        let tolerance = self.loops.get(name).expect("known loop").setpoint().tolerance;
        let severity = if worsening >= tolerance * 2.0 {
            RiskSeverity::High
        } else if worsening >= tolerance {
            RiskSeverity::Medium
        } else {
            RiskSeverity::Low
        };
        self.positive_feedback_risks.push(PositiveFeedbackRisk {
            id: Uuid::new_v4(),
            detected_at: now,
            trigger_loop: snapshot.trigger.to_string(),
            affected_loop: name.to_string(),
            baseline_deviation: baseline,
            worsened_deviation: magnitude_now,
            severity,
        });
    }

    /// Fire a correction against `name`: resets its deviation streak and
    /// snapshots every other loop's current deviation magnitude so a
    /// subsequent worsening observation can be attributed to it.
    fn fire_correction(&mut self, name: &'static str) {
        let baseline: HashMap<&'static str, f64> = self
            .loops
            .iter()
            .filter(|(n, _)| **n != name)
            .map(|(n, l)| {
                let magnitude = l.latest().map(|v| l.setpoint().deviation(v).abs()).unwrap_or(0.0);
                (*n, magnitude)
            })
            .collect();
        self.loops.get_mut(name).expect("known loop").record_correction();
        self.last_correction = Some(CorrectionSnapshot { trigger: name, baseline });
    }

    pub fn loop_named(&self, name: &str) -> Option<&FeedbackLoop> {
        self.loops.get(name)
    }

    /// Cumulative stress score across all five loops (spec §4.6,
    /// "allostatic-load score (cumulative stress)"): system-level, since
    /// the data model tracks feedback loops per system, not per person.
    pub fn allostatic_load(&self) -> f64 {
        self.allostatic_load
    }

    pub fn positive_feedback_risks(&self) -> &[PositiveFeedbackRisk] {
        &self.positive_feedback_risks
    }

    /// Take every risk detected since the last drain, for callers (the
    /// tick actor) that persist each risk exactly once as it appears.
    pub fn drain_positive_feedback_risks(&mut self) -> Vec<PositiveFeedbackRisk> {
        std::mem::take(&mut self.positive_feedback_risks)
    }

    /// Loops whose deviation streak has crossed [`OVERLOAD_STREAK`] after
    /// already having had a correction fired — i.e. the correction didn't
    /// hold and the loop kept deviating.
    pub fn at_risk_loops(&self) -> Vec<&'static str> {
        self.loops
            .iter()
            .filter(|(_, l)| l.correction_count() > 0 && l.consecutive_deviations() >= OVERLOAD_STREAK)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Roll all five loops up into one allostasis classification: steady
    /// if none are deviating, compensated if some are deviating but
    /// haven't outrun correction, overloaded if any loop is still
    /// deviating past [`OVERLOAD_STREAK`] despite a correction already
    /// having fired.
    pub fn state(&self) -> AllostasisState {
        if !self.at_risk_loops().is_empty() {
            return AllostasisState::AllostaticOverload;
        }
        if self.loops.values().any(|l| l.consecutive_deviations() > 0) {
            return AllostasisState::Compensated;
        }
        AllostasisState::Homeostasis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_service_is_in_homeostasis() {
        let service = HomeostasisService::new();
        assert_eq!(service.state(), AllostasisState::Homeostasis);
        assert!(service.at_risk_loops().is_empty());
        assert_eq!(service.allostatic_load(), 0.0);
    }

    #[test]
    fn single_deviation_moves_to_compensated_not_overload() {
        let mut service = HomeostasisService::new();
        service.observe(COVERAGE_RATE, 0.5, Utc::now());
        assert_eq!(service.state(), AllostasisState::Compensated);
        assert!(service.allostatic_load() > 0.0);
    }

    #[test]
    fn streak_past_correction_threshold_fires_an_automatic_correction() {
        let mut service = HomeostasisService::new();
        for _ in 0..CORRECTION_THRESHOLD {
            service.observe(ACGME_COMPLIANCE, 0.80, Utc::now());
        }
        let fl = service.loop_named(ACGME_COMPLIANCE).unwrap();
        assert_eq!(fl.correction_count(), 1);
        assert_eq!(fl.consecutive_deviations(), 0);
    }

    #[test]
    fn sustained_deviation_despite_correction_moves_to_allostatic_overload() {
        let mut service = HomeostasisService::new();
        let now = Utc::now();
        for _ in 0..CORRECTION_THRESHOLD {
            service.observe(ACGME_COMPLIANCE, 0.80, now);
        }
        assert_eq!(service.state(), AllostasisState::Compensated);
        for _ in 0..OVERLOAD_STREAK {
            service.observe(ACGME_COMPLIANCE, 0.80, now);
        }
        assert_eq!(service.state(), AllostasisState::AllostaticOverload);
        assert!(service.at_risk_loops().contains(&ACGME_COMPLIANCE));
    }

    #[test]
    fn correction_on_one_loop_worsening_another_is_raised_as_a_risk() {
        let mut service = HomeostasisService::new();
        let now = Utc::now();
        // Push workload-balance past correction threshold; the fired
        // correction snapshots every other loop's current deviation.
        for _ in 0..CORRECTION_THRESHOLD {
            service.observe(WORKLOAD_BALANCE, 0.9, now);
        }
        assert!(service.positive_feedback_risks().is_empty());

        // schedule-stability was untouched (deviation 0) at snapshot
        // time; now it deviates sharply, worse than its 0 baseline.
        service.observe(SCHEDULE_STABILITY, 0.4, now);

        assert_eq!(service.positive_feedback_risks().len(), 1);
        let risk = &service.positive_feedback_risks()[0];
        assert_eq!(risk.trigger_loop, WORKLOAD_BALANCE);
        assert_eq!(risk.affected_loop, SCHEDULE_STABILITY);
        assert!(risk.worsened_deviation > risk.baseline_deviation);
    }

    #[test]
    fn correction_resets_the_streak_back_toward_homeostasis() {
        let mut service = HomeostasisService::new();
        let now = Utc::now();
        for _ in 0..4 {
            service.observe(WORKLOAD_BALANCE, 0.9, now);
        }
        assert_eq!(service.loop_named(WORKLOAD_BALANCE).unwrap().consecutive_deviations(), 1);
    }

    #[test]
    #[should_panic(expected = "unknown feedback loop")]
    fn observing_an_unknown_loop_panics() {
        let mut service = HomeostasisService::new();
        service.observe("not-a-real-loop", 1.0, Utc::now());
    }
}
