//! Step 5: activity solver (spec §4.1).
//!
//! Runs the main assignment solver over the resident-clinic demand
//! expansion (step 2) computed, now that PCAT/day-off synchronization
//! (step 4) has already locked in next-day supervision capacity. Every
//! newly-placed resident-clinic block is checked here for faculty
//! supervision/PCAT presence on the same block and flagged with a
//! `SupervisionRatio` violation otherwise — the validator (§4.3) reruns
//! this rule independently over the full committed schedule.

use crate::{PipelineError, PipelineResult, PipelineState};
use residency_constraints::{ConstraintSet, Severity, UniquenessConstraint, Violation, ViolationKind};
use residency_core::{ActivityKind, Algorithm, Assignment, BlockId};
use residency_solver::{SolveContext, SolveParams, SolverStatus};
use std::collections::HashSet;

pub fn run(state: &mut PipelineState, algorithm: Algorithm) -> PipelineResult<SolverStatus> {
    let demand = state.resident_demand.clone().unwrap_or_default();
    let existing = state.store.list_assignments();

    let ctx = SolveContext { demand, existing };
    let constraints = ConstraintSet::new().with(Box::new(UniquenessConstraint));
    let params = SolveParams {
        timeout_secs: state.bundle.solver_config.timeout_secs(),
        seed: state.bundle.solver_config.seed(),
    };
    let result = residency_solver::solve(algorithm, &ctx, &constraints, params);

    for assignment in &result.assignments {
        state
            .store
            .upsert_assignment(assignment.clone())
            .map_err(PipelineError::Core)?;
    }
    state.violations.extend(result.violations.clone());
    state.violations.extend(supervision_gaps(state, &result.assignments));

    Ok(result.status)
}

fn supervising_template_ids(state: &PipelineState) -> HashSet<residency_core::RotationTemplateId> {
    state
        .bundle
        .templates
        .iter()
        .filter(|t| matches!(t.activity_kind(), ActivityKind::Supervision | ActivityKind::Inpatient))
        .map(|t| t.id())
        .collect()
}

/// Blocks carrying a freshly-placed resident-clinic assignment but no
/// faculty supervision/PCAT presence on the same block.
fn supervision_gaps(state: &PipelineState, placed: &[Assignment]) -> Vec<Violation> {
    let supervising = supervising_template_ids(state);
    let all = state.store.list_assignments();
    let covered_blocks: HashSet<BlockId> = all
        .iter()
        .filter(|a| supervising.contains(&a.template()))
        .map(|a| a.block())
        .collect();

    placed
        .iter()
        .filter(|a| !covered_blocks.contains(&a.block()))
        .map(|a| {
            Violation::new(
                ViolationKind::SupervisionRatio,
                Severity::High,
                "resident clinic slot lacks supervising faculty/PCAT coverage",
            )
            .for_person(a.person())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_core::{
        AssignmentRole, Block, DateInterval, MemStore, PersonId, RotationTemplateId, RunBundle,
        RunId, SolverConfig, TimeOfDay,
    };
    use chrono::NaiveDate;

    #[test]
    fn placed_resident_slot_without_supervision_is_flagged() {
        let d = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(); // Monday
        let block = Block::new(d, TimeOfDay::Am, 0, false);
        let resident = PersonId::new();
        let template = RotationTemplateId::new();
        let bundle = RunBundle {
            interval: DateInterval::new(d, d),
            people: vec![],
            blocks: vec![block.clone()],
            templates: vec![],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().build().unwrap(),
        };
        let store = MemStore::new();
        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        state.resident_demand = Some(vec![residency_solver::DemandSlot {
            block: block.id(),
            template,
            eligible_people: vec![resident],
        }]);

        run(&mut state, Algorithm::Greedy).unwrap();

        assert!(store.find_assignment(block.id(), resident).is_some());
        assert!(state
            .violations
            .iter()
            .any(|v| matches!(v.kind, ViolationKind::SupervisionRatio)));
    }

    #[test]
    fn supervised_slot_has_no_gap_violation() {
        let d = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        let block = Block::new(d, TimeOfDay::Am, 0, false);
        let resident = PersonId::new();
        let faculty = PersonId::new();
        let clinic_template = RotationTemplateId::new();
        let supervision_template_def =
            residency_core::RotationTemplate::new("PCAT", "PCAT", ActivityKind::Supervision, "pcat");
        let supervision_template = supervision_template_def.id();

        let bundle = RunBundle {
            interval: DateInterval::new(d, d),
            people: vec![],
            blocks: vec![block.clone()],
            templates: vec![supervision_template_def],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().build().unwrap(),
        };
        let store = MemStore::new();
        store
            .upsert_assignment(Assignment::new(
                block.id(),
                faculty,
                supervision_template,
                AssignmentRole::Supervision,
            ))
            .unwrap();

        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        state.resident_demand = Some(vec![residency_solver::DemandSlot {
            block: block.id(),
            template: clinic_template,
            eligible_people: vec![resident],
        }]);

        run(&mut state, Algorithm::Greedy).unwrap();

        assert!(!state
            .violations
            .iter()
            .any(|v| matches!(v.kind, ViolationKind::SupervisionRatio)));
    }
}
