//! Autonomous improvement loop controller (spec §4.4).
//!
//! Drives `pipeline -> validate -> score -> mutate -> persist ->
//! terminate` until one of five stop conditions fires. Grounded on the
//! teacher's `AutonomousLoopController::run()/cycle()/stop()` shape
//! (simplified: no Ed25519-signed audit chain — see DESIGN.md), with
//! `residency-concurrency::CancelToken` standing in for the teacher's
//! stop signal.

use crate::config::LoopConfig;
use crate::mutate::mutate;
use crate::persistence::RunDirectory;
use crate::record::IterationRecord;
use crate::score::score;
use crate::state::{LoopState, StopReason};
use chrono::Utc;
use residency_core::{Assignment, MemStore, RunBundle, RunId};
use residency_validator::{ValidationContext, ValidationReport, Validator};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("run directory I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Pipeline(#[from] residency_pipeline::PipelineError),

    #[error("no persisted state found for run {0}; cannot resume")]
    NoStateToResume(RunId),
}

pub type LoopResult<T> = std::result::Result<T, LoopError>;

/// `{run-id, success, stop-reason, final-score, final-iteration,
/// total-time}` (spec §4.4, "Result object").
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub run_id: RunId,
    pub success: bool,
    pub stop_reason: StopReason,
    pub final_score: f64,
    pub final_iteration: u32,
    pub total_time: std::time::Duration,
}

pub struct LoopController {
    runs_root: PathBuf,
    cancel: residency_concurrency::CancelToken,
}

impl LoopController {
    pub fn new(runs_root: impl Into<PathBuf>) -> Self {
        Self {
            runs_root: runs_root.into(),
            cancel: residency_concurrency::CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: residency_concurrency::CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> residency_concurrency::CancelToken {
        self.cancel.clone()
    }

    /// Start a fresh run.
    #[tracing::instrument(skip(self, bundle, config))]
    pub fn run(&self, bundle: RunBundle, config: LoopConfig, run_id: RunId) -> LoopResult<LoopOutcome> {
        let config = config.normalized();
        let initial = LoopState {
            run_id,
            next_iteration: 1,
            best_score: f64::MIN,
            stagnation_counter: 0,
            solver_config: bundle.solver_config.clone(),
            config,
            stop_reason: None,
        };
        self.drive(bundle, initial)
    }

    /// Rehydrate `state`/`history`/best-so-far for `run_id` and continue
    /// from the next iteration (spec §4.4, "Resumption").
    #[tracing::instrument(skip(self, bundle))]
    pub fn resume(&self, bundle: RunBundle, run_id: RunId) -> LoopResult<LoopOutcome> {
        let run_dir = RunDirectory::new(&self.runs_root, run_id);
        if !run_dir.state_exists() {
            return Err(LoopError::NoStateToResume(run_id));
        }
        let state = run_dir.read_state()?;
        self.drive(bundle, state)
    }

    fn drive(&self, bundle: RunBundle, initial: LoopState) -> LoopResult<LoopOutcome> {
        let run_id = initial.run_id;
        let run_dir = RunDirectory::new(&self.runs_root, run_id);
        run_dir.ensure()?;

        let config = initial.config;
        let mut solver_config = initial.solver_config;
        let mut best_score = initial.best_score;
        let mut stagnation_counter = initial.stagnation_counter;
        let mut best_assignments: Vec<Assignment> = Vec::new();
        let mut best_report: Option<ValidationReport> = None;

        let start = Instant::now();
        let mut iteration = initial.next_iteration.max(1);
        let mut last_completed = iteration.saturating_sub(1);

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if start.elapsed() >= config.time_limit {
                break StopReason::TimedOut;
            }
            if iteration > config.max_iterations {
                break StopReason::Exhausted;
            }

            let mut iteration_bundle = bundle.clone();
            iteration_bundle.solver_config = solver_config.clone();
            let store = MemStore::new();
            let algorithm = solver_config.algorithm();

            let pipeline_result = residency_pipeline::run_pipeline(store, iteration_bundle.clone(), run_id, algorithm);

            let (iteration_score, report, assignments, status, stagnated) = match pipeline_result {
                Ok(outcome) => {
                    let mut templates = iteration_bundle.templates.clone();
                    templates.extend(outcome.placeholder_templates.clone());
                    let ctx = ValidationContext::new(
                        iteration_bundle.interval,
                        &outcome.assignments,
                        &iteration_bundle.people,
                        &templates,
                        &iteration_bundle.blocks,
                        &iteration_bundle.absences,
                    );
                    let report = Validator::new().validate(&ctx);
                    let s = score(&config, &report);
                    let strictly_better = s > best_score + config.epsilon;
                    (s, report, outcome.assignments, outcome.status, !strictly_better)
                }
                Err(e) => {
                    tracing::warn!(iteration, error = %e, "pipeline reported an infeasible iteration");
                    run_dir.append_log(format!("iteration {iteration}: infeasible ({e})"))?;
                    (
                        0.0,
                        ValidationReport::new(0.0, vec![]),
                        Vec::new(),
                        residency_core::RunStatus::Failed,
                        true,
                    )
                }
            };

            let is_best = iteration_score > best_score + config.epsilon;
            if is_best {
                best_score = iteration_score;
                best_assignments = assignments;
                best_report = Some(report.clone());
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }

            let record = IterationRecord {
                iteration,
                recorded_at: Utc::now(),
                status,
                algorithm,
                timeout_secs: solver_config.timeout_secs(),
                seed: solver_config.seed(),
                coverage_rate: report.coverage_rate,
                compliance_score: report.compliance_score(),
                violation_penalty: report.violation_penalty(),
                score: iteration_score,
                is_best_so_far: is_best,
                stagnation_counter,
            };
            run_dir.append_history(&record)?;
            run_dir.append_log(format!(
                "iteration {iteration}: score={iteration_score:.4} best={best_score:.4} stagnation={stagnation_counter}"
            ))?;
            run_dir.write_schedule(&best_assignments)?;
            if let Some(r) = &best_report {
                run_dir.write_report(r)?;
            }

            last_completed = iteration;

            if best_score >= config.target_score {
                break StopReason::TargetReached;
            }
            if stagnation_counter >= config.stagnation_limit {
                break StopReason::Stagnation;
            }

            solver_config = mutate(&solver_config, stagnated, config.max_timeout_secs);
            iteration += 1;

            let checkpoint = LoopState {
                run_id,
                next_iteration: iteration,
                best_score,
                stagnation_counter,
                solver_config: solver_config.clone(),
                config,
                stop_reason: None,
            };
            run_dir.write_state(&checkpoint)?;
        };

        let final_state = LoopState {
            run_id,
            next_iteration: last_completed + 1,
            best_score,
            stagnation_counter,
            solver_config,
            config,
            stop_reason: Some(stop_reason),
        };
        run_dir.write_state(&final_state)?;

        Ok(LoopOutcome {
            run_id,
            success: matches!(stop_reason, StopReason::TargetReached),
            stop_reason,
            final_score: best_score,
            final_iteration: last_completed,
            total_time: start.elapsed(),
        })
    }
}

/// Convenience for callers that only need a scratch run directory (e.g.
/// the resilience harness, which does not itself resume).
pub fn default_runs_root() -> PathBuf {
    Path::new(".").join("runs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use residency_core::{DateInterval, FacultyRole, Person, SolverConfig, TimeOfDay};
    use std::collections::BTreeSet;

    fn small_bundle() -> RunBundle {
        let faculty = Person::new_faculty([FacultyRole::CoreFaculty].into_iter().collect(), BTreeSet::new()).unwrap();
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
            people: vec![faculty],
            blocks,
            templates: vec![],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().timeout_secs(5).build().unwrap(),
        }
    }

    /// S4-shaped: a tiny bundle converges quickly or exhausts within a
    /// small iteration cap, never panicking or hanging.
    #[test]
    fn loop_terminates_within_max_iterations_on_a_trivial_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let controller = LoopController::new(dir.path());
        let config = LoopConfig {
            max_iterations: 3,
            target_score: 2.0, // unreachable, forces exhaustion or stagnation
            stagnation_limit: 2,
            ..LoopConfig::default()
        };
        let outcome = controller.run(small_bundle(), config, RunId::new()).unwrap();
        assert!(matches!(
            outcome.stop_reason,
            StopReason::Exhausted | StopReason::Stagnation
        ));
        assert!(outcome.final_iteration <= 3);
    }

    #[test]
    fn resume_without_prior_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let controller = LoopController::new(dir.path());
        let err = controller.resume(small_bundle(), RunId::new());
        assert!(matches!(err, Err(LoopError::NoStateToResume(_))));
    }

    #[test]
    fn resume_continues_from_the_persisted_next_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let run_id = RunId::new();
        let controller = LoopController::new(dir.path());
        let config = LoopConfig {
            max_iterations: 2,
            target_score: 2.0,
            stagnation_limit: 1,
            ..LoopConfig::default()
        };
        let first = controller.run(small_bundle(), config.clone(), run_id).unwrap();
        assert!(first.final_iteration >= 1);

        // Simulate a process restart: a fresh controller over the same
        // runs root picks up where the first left off.
        let resumed_controller = LoopController::new(dir.path());
        let resumed = resumed_controller.resume(small_bundle(), run_id).unwrap();
        assert!(resumed.final_iteration >= first.final_iteration);
    }

    /// Cancellation stops the loop on the next iteration boundary.
    #[test]
    fn cancellation_stops_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let controller = LoopController::new(dir.path());
        controller.cancel_token().cancel();
        let config = LoopConfig {
            max_iterations: 10,
            target_score: 2.0,
            ..LoopConfig::default()
        };
        let outcome = controller.run(small_bundle(), config, RunId::new()).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.final_iteration, 0);
    }
}
