//! The resilience engine's tick actor: one pass of Monitor → Analyze →
//! Plan → Execute → Knowledge per invocation, grounded on the teacher's
//! `knhk-autonomic` crate's `AutonomicController` decomposition
//! (`reference_autonomic/src/lib.rs`), generalized from its generic
//! `Metric`/`Policy`/`Action` types to this system's concrete utilization,
//! defense, and sacrifice-hierarchy signals.

use crate::defense::{baseline_shedding_level, defense_level};
use crate::fallback::FallbackScheduler;
use crate::homeostasis::{
    AllostasisState, HomeostasisService, ACGME_COMPLIANCE, COVERAGE_RATE, FACULTY_UTILIZATION,
    SCHEDULE_STABILITY, WORKLOAD_BALANCE,
};
use crate::sacrifice::SacrificeHierarchy;
use crate::utilization::{UtilizationMonitor, UtilizationSnapshot};
use chrono::{DateTime, Utc};
use residency_core::{DefenseLevel, ResilienceEvent, ResilienceHealthCheck, SacrificeMethod, Store, UtilizationLevel};
use uuid::Uuid;

/// The observations one tick needs. The tick actor doesn't compute these
/// itself — `coverage_rate`/`compliance_score` come from a
/// `ValidationReport`, `workload_balance`/`schedule_stability` from
/// whatever run comparison produced them, and `n1_pass`/`n2_pass` from
/// the contingency analyzer.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    pub servers: u32,
    pub arrival_rate: f64,
    pub service_rate: f64,
    pub coverage_rate: f64,
    pub compliance_score: f64,
    pub workload_balance: f64,
    pub schedule_stability: f64,
    pub n1_pass: bool,
    pub n2_pass: bool,
}

#[derive(Default)]
pub struct TickActor {
    pub utilization: UtilizationMonitor,
    pub fallback: FallbackScheduler,
    pub sacrifice: SacrificeHierarchy,
    pub homeostasis: HomeostasisService,
}

impl TickActor {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, store))]
    pub fn tick(&mut self, store: &dyn Store, input: TickInput, now: DateTime<Utc>) -> ResilienceHealthCheck {
        // Monitor: observe the queueing state.
        let snapshot = UtilizationSnapshot::compute(input.servers, input.arrival_rate, input.service_rate, now);
        self.utilization.record(snapshot);

        // Analyze: derive the defense posture and roll the five feedback
        // loops into one allostasis classification.
        let defense = defense_level(snapshot.level, input.n1_pass, input.n2_pass, self.fallback.any_active());
        self.homeostasis.observe(COVERAGE_RATE, input.coverage_rate, now);
        self.homeostasis.observe(FACULTY_UTILIZATION, snapshot.rho, now);
        self.homeostasis.observe(WORKLOAD_BALANCE, input.workload_balance, now);
        self.homeostasis.observe(SCHEDULE_STABILITY, input.schedule_stability, now);
        self.homeostasis.observe(ACGME_COMPLIANCE, input.compliance_score, now);
        let allostasis = self.homeostasis.state();
        for risk in self.homeostasis.drain_positive_feedback_risks() {
            tracing::warn!(trigger = %risk.trigger_loop, affected = %risk.affected_loop, severity = ?risk.severity, "positive-feedback-loop risk detected");
            store.append_positive_feedback_risk(risk);
        }
        let crisis = snapshot.level == UtilizationLevel::Black
            || defense == DefenseLevel::Emergency
            || allostasis == AllostasisState::AllostaticOverload;

        // Plan: the load-shedding tier utilization implies, absent any
        // other override.
        let desired_shedding = baseline_shedding_level(snapshot.level);

        // Execute: apply the shedding transition if the tier changed.
        if desired_shedding != self.sacrifice.current() {
            let reason = format!("utilization tier now {:?} (rho={:.3})", snapshot.level, snapshot.rho);
            let decision = self
                .sacrifice
                .transition(desired_shedding, reason, "tick-actor", SacrificeMethod::Automatic, now);
            tracing::warn!(from = ?decision.from_level, to = ?decision.to_level, "load-shedding tier changed");
            store.append_sacrifice_decision(decision);
        }

        // Knowledge: persist the health snapshot and, if this tick is a
        // crisis, a dedicated event row for faster incident triage.
        let health = ResilienceHealthCheck {
            id: Uuid::new_v4(),
            recorded_at: now,
            utilization_level: snapshot.level,
            defense_level: defense,
            load_shedding_level: self.sacrifice.current(),
            n1_pass: input.n1_pass,
            n2_pass: input.n2_pass,
            active_fallback_tags: self.fallback.active_tags(),
            crisis,
            metrics: serde_json::json!({
                "rho": snapshot.rho,
                "queue_length": snapshot.queue_length,
                "wait_hours": snapshot.wait_hours,
                "allostasis_state": format!("{allostasis:?}"),
                "allostatic_load": self.homeostasis.allostatic_load(),
                "at_risk_loops": self.homeostasis.at_risk_loops(),
            }),
        };
        store.append_health_check(health.clone());

        if crisis {
            store.append_resilience_event(ResilienceEvent {
                id: Uuid::new_v4(),
                recorded_at: now,
                kind: "crisis".to_string(),
                message: format!("defense level {defense:?}, utilization {:?}", snapshot.level),
                metrics: health.metrics.clone(),
            });
        }

        health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_core::MemStore;

    #[test]
    fn low_utilization_tick_stays_calm() {
        let store = MemStore::new();
        let mut actor = TickActor::new();
        let input = TickInput {
            servers: 5,
            arrival_rate: 1.0,
            service_rate: 1.0,
            coverage_rate: 0.97,
            compliance_score: 1.0,
            workload_balance: 0.15,
            schedule_stability: 0.96,
            n1_pass: true,
            n2_pass: true,
        };
        let health = actor.tick(&*store, input, Utc::now());
        assert_eq!(health.utilization_level, UtilizationLevel::Green);
        assert_eq!(health.defense_level, DefenseLevel::Prevention);
        assert!(!health.crisis);
        assert_eq!(store.health_checks().len(), 1);
        assert!(store.sacrifice_decisions().is_empty());
    }

    #[test]
    fn saturating_utilization_escalates_shedding_and_flags_a_crisis() {
        let store = MemStore::new();
        let mut actor = TickActor::new();
        let input = TickInput {
            servers: 5,
            arrival_rate: 4.95,
            service_rate: 1.0,
            coverage_rate: 0.5,
            compliance_score: 0.5,
            workload_balance: 0.4,
            schedule_stability: 0.5,
            n1_pass: false,
            n2_pass: false,
        };
        let health = actor.tick(&*store, input, Utc::now());
        assert_eq!(health.utilization_level, UtilizationLevel::Black);
        assert_eq!(health.defense_level, DefenseLevel::Emergency);
        assert!(health.crisis);
        assert_eq!(store.sacrifice_decisions().len(), 1);
        assert_eq!(store.sacrifice_decisions()[0].to_level, residency_core::LoadSheddingLevel::Black);
        assert_eq!(store.resilience_events().len(), 1);
    }
}
