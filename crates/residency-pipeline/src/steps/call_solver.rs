//! Step 3: call solver (spec §4.1).
//!
//! Produces fresh `CallAssignment`s for the interval, one per calendar
//! day, assigned to an eligible faculty member. The resulting
//! assignments feed PCAT/DO synchronization (step 4) before the activity
//! solver (step 5) ever runs, so call coverage counts as supervision
//! capacity the moment it exists.

use crate::{PipelineError, PipelineResult, PipelineState};
use residency_core::{ActivityKind, Block, CallAssignment, RotationTemplate, TimeOfDay};
use residency_constraints::ConstraintSet;
use residency_solver::{DemandSlot, SolveContext, SolveParams, SolverStatus};
use std::collections::HashMap;

fn call_template(state: &PipelineState) -> residency_core::RotationTemplateId {
    state
        .bundle
        .templates
        .iter()
        .find(|t| t.activity_kind() == ActivityKind::Call)
        .map(|t| t.id())
        .unwrap_or_else(|| RotationTemplate::new("CALL", "CALL", ActivityKind::Call, "call").id())
}

pub fn run(
    state: &mut PipelineState,
    algorithm: residency_core::Algorithm,
) -> PipelineResult<SolverStatus> {
    let template = call_template(state);

    let eligible_faculty: Vec<_> = state
        .bundle
        .people
        .iter()
        .filter(|p| p.is_faculty() && p.is_active())
        .map(|p| p.id())
        .collect();

    let am_blocks_by_date: HashMap<_, &Block> = state
        .bundle
        .blocks
        .iter()
        .filter(|b| b.time_of_day() == TimeOfDay::Am && !b.is_weekend())
        .map(|b| (b.date(), b))
        .collect();

    let existing = state.store.list_assignments();
    let demand: Vec<DemandSlot> = am_blocks_by_date
        .values()
        .map(|block| DemandSlot {
            block: block.id(),
            template,
            eligible_people: eligible_faculty.clone(),
        })
        .collect();

    let ctx = SolveContext { demand, existing };
    let constraints = ConstraintSet::new();
    let params = SolveParams {
        timeout_secs: state.bundle.solver_config.timeout_secs(),
        seed: state.bundle.solver_config.seed(),
    };
    let result = residency_solver::solve(algorithm, &ctx, &constraints, params);

    let block_dates: HashMap<_, _> = am_blocks_by_date
        .into_iter()
        .map(|(date, block)| (block.id(), date))
        .collect();

    for assignment in &result.assignments {
        state
            .store
            .upsert_assignment(assignment.clone())
            .map_err(PipelineError::Core)?;
        if let Some(&date) = block_dates.get(&assignment.block()) {
            state.new_call_assignments.push(CallAssignment::new(
                assignment.block(),
                assignment.person(),
                assignment.template(),
                date,
            ));
        }
    }
    state.violations.extend(result.violations);

    Ok(result.status)
}
