//! The ordered scheduling pipeline (spec §4.1).
//!
//! `Call → PCAT/DO → AT-coverage → Resident clinic load → Faculty admin
//! fill` is a correctness property, not a convenience ordering: PCAT
//! counts toward supervision coverage, so it must exist before the
//! activity solver runs, and faculty fill needs the resident clinic
//! demand the activity solver produces. [`PipelineState::begin_step`]
//! asserts strictly increasing step order and panics (a programmer
//! error, per spec §4.1) on any inversion — this is deliberately not a
//! recoverable `Result`, matching "MUST be detected by assertion".

pub mod calendar;
pub mod steps;

use chrono::{DateTime, Utc};
use residency_constraints::Violation;
use residency_core::{
    Algorithm, Assignment, DateInterval, PlaceholderRegistry, RotationTemplate, RunBundle, RunId,
    RunStatus, Store,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("hard constraint violated: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Core(#[from] residency_core::CoreError),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStep {
    PreloadNonCall = 0,
    Expansion = 1,
    CallSolver = 2,
    PcatDoSync = 3,
    ActivitySolver = 4,
    FacultyHalfDayFill = 5,
}

use serde::{Deserialize, Serialize};

/// A single recorded step timestamp, used to prove P1 (pipeline order)
/// against a completed Run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    pub step: PipelineStep,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Shared, mutable state threaded through the six pipeline steps.
pub struct PipelineState {
    pub store: Arc<dyn Store>,
    pub bundle: RunBundle,
    pub placeholders: PlaceholderRegistry,
    pub run_id: RunId,
    last_step: Option<PipelineStep>,
    pub step_executions: Vec<StepExecution>,
    pub violations: Vec<Violation>,
    /// New call assignments produced by the call solver (step 3),
    /// consumed by PCAT/DO sync (step 4).
    pub new_call_assignments: Vec<residency_core::CallAssignment>,
    /// Resident clinic demand slots produced by expansion (step 2),
    /// consumed by the activity solver (step 5).
    pub resident_demand: Option<Vec<residency_solver::DemandSlot>>,
}

impl PipelineState {
    pub fn new(store: Arc<dyn Store>, bundle: RunBundle, run_id: RunId) -> Self {
        Self {
            store,
            bundle,
            placeholders: PlaceholderRegistry::new(),
            run_id,
            last_step: None,
            step_executions: Vec::new(),
            violations: Vec::new(),
            new_call_assignments: Vec::new(),
            resident_demand: None,
        }
    }

    pub fn interval(&self) -> DateInterval {
        self.bundle.interval
    }

    /// Assert that `step` strictly follows whatever step last ran, per
    /// the dependency chain in §4.1. A violation here is a programmer
    /// error — e.g. invoking the activity solver before PCAT/DO sync —
    /// not a data problem, so it panics rather than returning an `Err`.
    fn begin_step(&mut self, step: PipelineStep) -> DateTime<Utc> {
        if let Some(last) = self.last_step {
            assert!(
                step > last,
                "pipeline dependency inversion: attempted to run {step:?} after {last:?}; \
                 steps must run in the order defined by spec §4.1"
            );
        } else {
            assert_eq!(
                step,
                PipelineStep::PreloadNonCall,
                "pipeline must begin with PreloadNonCall, attempted to start at {step:?}"
            );
        }
        self.last_step = Some(step);
        Utc::now()
    }

    fn end_step(&mut self, step: PipelineStep, started_at: DateTime<Utc>) {
        self.step_executions.push(StepExecution {
            step,
            started_at,
            finished_at: Utc::now(),
        });
    }
}

/// Final outcome of a pipeline invocation (spec §6).
pub struct PipelineOutcome {
    pub status: RunStatus,
    pub assignments: Vec<Assignment>,
    pub violations: Vec<Violation>,
    pub step_executions: Vec<StepExecution>,
    /// The eight reserved placeholder templates this run minted (faculty
    /// half-day fill, step 6). Not part of the input bundle, so a caller
    /// building a `ValidationContext` over `assignments` must fold these
    /// into the bundle's own templates or the validator can't resolve the
    /// placeholder assignments' template ids.
    pub placeholder_templates: Vec<RotationTemplate>,
}

/// Run the six-step pipeline over `bundle`, persisting assignments to
/// `store` as each step commits them.
#[tracing::instrument(skip(store, bundle))]
pub fn run_pipeline(
    store: Arc<dyn Store>,
    bundle: RunBundle,
    run_id: RunId,
    solver_algorithm: Algorithm,
) -> PipelineResult<PipelineOutcome> {
    let mut state = PipelineState::new(store, bundle, run_id);

    let started = state.begin_step(PipelineStep::PreloadNonCall);
    steps::preload::run(&mut state)?;
    state.end_step(PipelineStep::PreloadNonCall, started);

    let started = state.begin_step(PipelineStep::Expansion);
    steps::expansion::run(&mut state)?;
    state.end_step(PipelineStep::Expansion, started);

    let started = state.begin_step(PipelineStep::CallSolver);
    let call_status = steps::call_solver::run(&mut state, solver_algorithm)?;
    state.end_step(PipelineStep::CallSolver, started);

    let started = state.begin_step(PipelineStep::PcatDoSync);
    steps::pcat_sync::run(&mut state)?;
    state.end_step(PipelineStep::PcatDoSync, started);

    let started = state.begin_step(PipelineStep::ActivitySolver);
    let activity_status = steps::activity_solver::run(&mut state, solver_algorithm)?;
    state.end_step(PipelineStep::ActivitySolver, started);

    let started = state.begin_step(PipelineStep::FacultyHalfDayFill);
    steps::faculty_fill::run(&mut state)?;
    state.end_step(PipelineStep::FacultyHalfDayFill, started);

    let timed_out = matches!(call_status, residency_solver::SolverStatus::Timeout)
        || matches!(activity_status, residency_solver::SolverStatus::Timeout);
    let infeasible = matches!(call_status, residency_solver::SolverStatus::Infeasible)
        || matches!(activity_status, residency_solver::SolverStatus::Infeasible);

    let status = if infeasible {
        return Err(PipelineError::ConstraintViolation(
            "solver reported an infeasible assignment".into(),
        ));
    } else if timed_out {
        RunStatus::Partial
    } else {
        RunStatus::Success
    };

    let assignments = state.store.list_assignments();
    Ok(PipelineOutcome {
        status,
        assignments,
        violations: state.violations,
        step_executions: state.step_executions,
        placeholder_templates: state.placeholders.all().to_vec(),
    })
}
