//! Fallback Scheduler (spec §4.5.4, P10): a registry of pre-computed
//! fallback schedules keyed by scenario tag, with an activation/
//! deactivation audit trail.
//!
//! Grounded on `residency-concurrency`'s `DistributedLock` bookkeeping
//! style (identity-checked handles, explicit release) — here the
//! "handle" is the scenario tag itself rather than a lock token, since
//! only one fallback per tag may be active at a time.

use crate::error::{ResilienceError, ResilienceResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use residency_core::{Assignment, FallbackActivation};
use uuid::Uuid;

/// Registry of pre-computed fallback assignment sets, one per named
/// scenario (e.g. "single-faculty-loss"), plus the currently-active
/// activations.
#[derive(Default)]
pub struct FallbackScheduler {
    registry: DashMap<String, Vec<Assignment>>,
    active: DashMap<String, FallbackActivation>,
}

impl FallbackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tag: impl Into<String>, assignments: Vec<Assignment>) {
        self.registry.insert(tag.into(), assignments);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.registry.contains_key(tag)
    }

    pub fn is_active(&self, tag: &str) -> bool {
        self.active.contains_key(tag)
    }

    pub fn any_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active_tags(&self) -> Vec<String> {
        self.active.iter().map(|r| r.key().clone()).collect()
    }

    /// Activate the fallback registered under `tag`. `coverage_rate` is
    /// the fallback schedule's own coverage, computed by the caller via
    /// the validator against the fallback's assignments.
    pub fn activate(
        &self,
        tag: &str,
        coverage_rate: f64,
        now: DateTime<Utc>,
    ) -> ResilienceResult<FallbackActivation> {
        if self.active.contains_key(tag) {
            return Err(ResilienceError::FallbackAlreadyActive(tag.to_string()));
        }
        let assignments = self
            .registry
            .get(tag)
            .ok_or_else(|| ResilienceError::UnknownFallbackScenario(tag.to_string()))?;

        let activation = FallbackActivation {
            id: Uuid::new_v4(),
            scenario_tag: tag.to_string(),
            activated_at: now,
            assignment_count: assignments.len(),
            coverage_rate,
            deactivated_at: None,
            deactivation_reason: None,
        };
        self.active.insert(tag.to_string(), activation.clone());
        Ok(activation)
    }

    /// Deactivate an active fallback, returning the closed-out audit
    /// record. P10: `respects_ordering()` must hold on the result.
    pub fn deactivate(
        &self,
        tag: &str,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> ResilienceResult<FallbackActivation> {
        let (_, mut activation) = self
            .active
            .remove(tag)
            .ok_or_else(|| ResilienceError::FallbackNotActive(tag.to_string()))?;
        activation.deactivated_at = Some(now);
        activation.deactivation_reason = Some(reason.into());
        Ok(activation)
    }

    pub fn assignments_for(&self, tag: &str) -> Option<Vec<Assignment>> {
        self.registry.get(tag).map(|r| r.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use residency_core::{AssignmentId, AssignmentRole, BlockId, PersonId, RotationTemplateId};

    fn sample_assignment() -> Assignment {
        Assignment::new(
            BlockId::new(),
            PersonId::new(),
            RotationTemplateId::new(),
            AssignmentRole::Primary,
        )
    }

    #[test]
    fn activating_an_unregistered_scenario_errors() {
        let scheduler = FallbackScheduler::new();
        let err = scheduler.activate("single-faculty-loss", 1.0, Utc::now()).unwrap_err();
        assert!(matches!(err, ResilienceError::UnknownFallbackScenario(_)));
    }

    #[test]
    fn activating_twice_errors_and_deactivating_unknown_tag_errors() {
        let scheduler = FallbackScheduler::new();
        scheduler.register("single-faculty-loss", vec![sample_assignment()]);
        let now = Utc::now();
        scheduler.activate("single-faculty-loss", 0.9, now).unwrap();
        let err = scheduler.activate("single-faculty-loss", 0.9, now).unwrap_err();
        assert!(matches!(err, ResilienceError::FallbackAlreadyActive(_)));

        let err = scheduler
            .deactivate("pcs-season-50-percent", "unused", now)
            .unwrap_err();
        assert!(matches!(err, ResilienceError::FallbackNotActive(_)));
    }

    /// P10: activation precedes deactivation on the audit record.
    #[test]
    fn activation_record_respects_ordering_after_a_full_cycle() {
        let scheduler = FallbackScheduler::new();
        scheduler.register("holiday-skeleton", vec![sample_assignment()]);
        let activated_at = Utc::now();
        scheduler.activate("holiday-skeleton", 0.8, activated_at).unwrap();
        assert!(scheduler.is_active("holiday-skeleton"));

        let closed = scheduler
            .deactivate("holiday-skeleton", "utilization returned to GREEN", activated_at + Duration::hours(6))
            .unwrap();
        assert!(closed.respects_ordering());
        assert!(!closed.is_active());
        assert!(!scheduler.is_active("holiday-skeleton"));
    }
}
