//! Resilience regression harness (spec §4.4, "Resilience regression
//! harness"; distinct operation mode from the improvement loop).
//!
//! Runs a library of seven named failure scenarios against the current
//! bundle and reports a pass/fail verdict plus average score
//! degradation. Each scenario perturbs the bundle the way the
//! Contingency Analyzer (§4.5.3) reasons about single/paired losses,
//! generalized here to broader capacity shocks (PCS season, pandemic
//! staffing, mass casualty, weather closure).

use crate::config::LoopConfig;
use crate::score::score;
use residency_core::{MemStore, Person, RunBundle, RunId};
use residency_validator::{ValidationContext, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    SingleFacultyLoss,
    DoubleFacultyLoss,
    PcsSeason50Percent,
    HolidaySkeleton,
    PandemicEssential,
    MassCasualty,
    WeatherEmergency,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::SingleFacultyLoss,
        Scenario::DoubleFacultyLoss,
        Scenario::PcsSeason50Percent,
        Scenario::HolidaySkeleton,
        Scenario::PandemicEssential,
        Scenario::MassCasualty,
        Scenario::WeatherEmergency,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Scenario::SingleFacultyLoss => "single-faculty-loss",
            Scenario::DoubleFacultyLoss => "double-faculty-loss",
            Scenario::PcsSeason50Percent => "pcs-season-50-percent",
            Scenario::HolidaySkeleton => "holiday-skeleton",
            Scenario::PandemicEssential => "pandemic-essential",
            Scenario::MassCasualty => "mass-casualty",
            Scenario::WeatherEmergency => "weather-emergency",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Remove the first `n` active faculty, in stable `people` order —
/// deterministic, mirroring the contingency analyzer's single/paired
/// removal but generalized to arbitrary capacity loss.
fn drop_faculty(people: &[Person], n: usize) -> Vec<Person> {
    let mut dropped = 0;
    people
        .iter()
        .filter(|p| {
            if p.is_faculty() && dropped < n {
                dropped += 1;
                false
            } else {
                true
            }
        })
        .cloned()
        .collect()
}

fn drop_fraction(people: &[Person], predicate: impl Fn(&Person) -> bool, fraction: f64) -> Vec<Person> {
    let eligible: Vec<usize> = people
        .iter()
        .enumerate()
        .filter(|(_, p)| predicate(p))
        .map(|(i, _)| i)
        .collect();
    let drop_count = ((eligible.len() as f64) * fraction).round() as usize;
    let to_drop: std::collections::HashSet<usize> = eligible.into_iter().take(drop_count).collect();
    people
        .iter()
        .enumerate()
        .filter(|(i, _)| !to_drop.contains(i))
        .map(|(_, p)| p.clone())
        .collect()
}

/// Apply a named scenario's perturbation to `bundle` (spec §6: `generate
/// --scenario <name>` selects one of these to run against, same
/// perturbations the resilience harness sweeps over in bulk).
pub fn perturb(bundle: &RunBundle, scenario: Scenario) -> RunBundle {
    let mut perturbed = bundle.clone();
    match scenario {
        Scenario::SingleFacultyLoss => perturbed.people = drop_faculty(&bundle.people, 1),
        Scenario::DoubleFacultyLoss => perturbed.people = drop_faculty(&bundle.people, 2),
        Scenario::PcsSeason50Percent => {
            perturbed.people = drop_fraction(&bundle.people, |p| p.is_resident(), 0.5)
        }
        Scenario::PandemicEssential => {
            perturbed.people = drop_fraction(&bundle.people, |p| p.is_resident(), 0.3)
        }
        Scenario::MassCasualty => perturbed.people = drop_fraction(&bundle.people, |_| true, 0.6),
        Scenario::HolidaySkeleton => {
            perturbed.blocks = bundle
                .blocks
                .iter()
                .map(|b| residency_core::Block::new(b.date(), b.time_of_day(), b.block_number(), true))
                .collect();
        }
        Scenario::WeatherEmergency => {
            let keep = (bundle.blocks.len() / 2).max(1);
            perturbed.blocks = bundle.blocks.iter().take(keep).cloned().collect();
        }
    }
    perturbed
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub feasible: bool,
    pub score: f64,
    pub degradation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessReport {
    pub threshold: f64,
    pub passed: bool,
    pub feasible_count: usize,
    pub total: usize,
    pub average_degradation: f64,
    pub results: Vec<ScenarioResult>,
}

/// Evaluate `bundle` (as-is) to get the baseline score, then run all
/// seven scenarios and compare. `threshold` is the minimum fraction of
/// feasible scenarios required to pass (spec: "Pass criterion: fraction
/// of feasible scenarios ≥ threshold"; S5).
pub fn run_resilience_harness(bundle: &RunBundle, config: &LoopConfig, threshold: f64) -> HarnessReport {
    let baseline_score = evaluate(bundle, config);

    let results: Vec<ScenarioResult> = Scenario::ALL
        .iter()
        .map(|&scenario| {
            let perturbed = perturb(bundle, scenario);
            let s = evaluate(&perturbed, config);
            let feasible = s > 0.0;
            ScenarioResult {
                scenario,
                feasible,
                score: s,
                degradation: (baseline_score - s).max(0.0),
            }
        })
        .collect();

    let feasible_count = results.iter().filter(|r| r.feasible).count();
    let total = results.len();
    let pass_rate = feasible_count as f64 / total as f64;
    let average_degradation = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.degradation).sum::<f64>() / results.len() as f64
    };

    HarnessReport {
        threshold,
        passed: pass_rate >= threshold,
        feasible_count,
        total,
        average_degradation,
        results,
    }
}

fn evaluate(bundle: &RunBundle, config: &LoopConfig) -> f64 {
    let store = MemStore::new();
    match residency_pipeline::run_pipeline(store, bundle.clone(), RunId::new(), bundle.solver_config.algorithm()) {
        Ok(outcome) => {
            let mut templates = bundle.templates.clone();
            templates.extend(outcome.placeholder_templates.clone());
            let ctx = ValidationContext::new(
                bundle.interval,
                &outcome.assignments,
                &bundle.people,
                &templates,
                &bundle.blocks,
                &bundle.absences,
            );
            let report = Validator::new().validate(&ctx);
            score(config, &report)
        }
        Err(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use residency_core::{DateInterval, FacultyRole, SolverConfig, TimeOfDay};
    use std::collections::BTreeSet;

    fn bundle_with_faculty(n: usize) -> RunBundle {
        let people = (0..n)
            .map(|_| Person::new_faculty([FacultyRole::CoreFaculty].into_iter().collect(), BTreeSet::new()).unwrap())
            .collect();
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = start + chrono::Duration::days(6);
        let mut blocks = Vec::new();
        let mut d = start;
        while d <= end {
            blocks.push(residency_core::Block::new(d, TimeOfDay::Am, 0, false));
            blocks.push(residency_core::Block::new(d, TimeOfDay::Pm, 0, false));
            d += chrono::Duration::days(1);
        }
        RunBundle {
            interval: DateInterval::new(start, end),
            people,
            blocks,
            templates: vec![],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().build().unwrap(),
        }
    }

    /// S1-shaped, exercised through `evaluate` (the same `run_pipeline` +
    /// `ValidationContext` + `Validator` path `run_resilience_harness`
    /// uses for its baseline): a fully covered roster scores at the
    /// coverage+compliance weight sum, meaning zero violations and full
    /// coverage, not a hand-assembled report.
    #[test]
    fn baseline_evaluation_of_a_fully_covered_roster_reaches_perfect_score() {
        use residency_core::{
            ActivityKind, Algorithm, Assignment, AssignmentRole, Block, Preload, PreloadKind,
            RotationTemplate,
        };
        use std::collections::HashSet;

        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let end = start + chrono::Duration::days(6);

        let mut people = Vec::new();
        let mut faculty = Vec::new();
        for _ in 0..2 {
            let specialties = ["resident-clinic".to_string()].into_iter().collect();
            let person =
                Person::new_faculty([FacultyRole::CoreFaculty].into_iter().collect(), specialties).unwrap();
            faculty.push(person.id());
            people.push(person);
        }
        for pgy in [1u8, 2] {
            people.push(Person::new_resident(pgy, BTreeSet::new()).unwrap());
        }

        let mut blocks = Vec::new();
        let mut d = start;
        let mut n = 0;
        while d <= end {
            blocks.push(Block::new(d, TimeOfDay::Am, n, false));
            blocks.push(Block::new(d, TimeOfDay::Pm, n, false));
            n += 1;
            d += chrono::Duration::days(1);
        }

        let supervision_template =
            RotationTemplate::new("SUP", "SUP", ActivityKind::Supervision, "resident-clinic");
        let templates = vec![
            RotationTemplate::new("RC", "RC", ActivityKind::Clinic, "resident-clinic"),
            supervision_template.clone(),
            RotationTemplate::new("CALL", "CALL", ActivityKind::Call, "call"),
            RotationTemplate::new("PCAT", "PCAT", ActivityKind::Supervision, "resident-clinic"),
        ];

        let solver_config = SolverConfig::builder().algorithm(Algorithm::Greedy).seed(3).build().unwrap();
        let unpreloaded = RunBundle {
            interval: DateInterval::new(start, end),
            people: people.clone(),
            blocks: blocks.clone(),
            templates: templates.clone(),
            absences: vec![],
            preloads: vec![],
            solver_config: solver_config.clone(),
        };

        // Same collision-free dry-run technique as
        // `residency-pipeline/tests/scenarios.rs`: a round-robin
        // preload can land on the exact (block, faculty) the call
        // solver independently assigns call to, and PCAT/day-off sync's
        // `upsert_assignment` has no fallback for that collision.
        let dry_store = MemStore::new();
        let dry = residency_pipeline::run_pipeline(dry_store, unpreloaded, RunId::new(), Algorithm::Greedy).unwrap();
        let claimed: HashSet<_> = dry
            .assignments
            .iter()
            .filter(|a| faculty.contains(&a.person()))
            .map(|a| (a.block(), a.person()))
            .collect();
        let preloads: Vec<Preload> = blocks
            .iter()
            .filter(|b| !b.is_weekend())
            .map(|block| {
                let supervisor =
                    faculty.iter().copied().find(|f| !claimed.contains(&(block.id(), *f))).unwrap();
                Preload {
                    assignment: Assignment::new(
                        block.id(),
                        supervisor,
                        supervision_template.id(),
                        AssignmentRole::Supervision,
                    ),
                    kind: PreloadKind::SupervisionModule,
                }
            })
            .collect();

        let bundle = RunBundle {
            interval: DateInterval::new(start, end),
            people,
            blocks,
            templates,
            absences: vec![],
            preloads,
            solver_config,
        };

        let config = LoopConfig::default();
        let s = evaluate(&bundle, &config);
        let expected = config.weight_coverage + config.weight_compliance;
        assert!((s - expected).abs() < 1e-9, "expected perfect score {expected}, got {s}");
    }

    /// S5-shaped: all seven scenarios run and produce a verdict.
    #[test]
    fn harness_evaluates_all_seven_named_scenarios() {
        let bundle = bundle_with_faculty(6);
        let report = run_resilience_harness(&bundle, &LoopConfig::default(), 0.8);
        assert_eq!(report.total, 7);
        assert_eq!(report.results.len(), 7);
        let tags: std::collections::HashSet<_> = report.results.iter().map(|r| r.scenario.tag()).collect();
        assert_eq!(tags.len(), 7);
    }

    #[test]
    fn losing_every_scenario_yields_a_failing_pass_rate() {
        // A single-faculty bundle: every scenario that drops faculty
        // leaves nobody to staff the schedule.
        let bundle = bundle_with_faculty(1);
        let report = run_resilience_harness(&bundle, &LoopConfig::default(), 0.8);
        assert!(report.feasible_count < report.total);
    }
}
