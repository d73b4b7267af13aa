//! Step 1: preload non-call assignments (spec §4.1).
//!
//! Loads absences, inpatient preloads, FMIT-call, inpatient-clinic,
//! resident-call, and supervision-module preloads into the store, all
//! committed locked. Faculty-call preloads are deliberately skipped here
//! (`skip_faculty_call = true`) — the call solver (step 3) is the only
//! producer of faculty call assignments.

use crate::{PipelineError, PipelineResult, PipelineState};
use residency_core::PreloadKind;

pub fn run(state: &mut PipelineState) -> PipelineResult<()> {
    for absence in state.bundle.absences.clone() {
        state.store.put_absence(absence)?;
    }

    for preload in state.bundle.preloads.clone() {
        if preload.kind == PreloadKind::FacultyCall {
            tracing::debug!(
                assignment = %preload.assignment.id(),
                "skipping faculty-call preload at preload step, per skip_faculty_call"
            );
            continue;
        }
        let locked = preload.assignment.locked();
        state
            .store
            .upsert_assignment(locked)
            .map_err(PipelineError::Core)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_core::{
        Assignment, AssignmentRole, BlockId, DateInterval, MemStore, Preload, PreloadKind,
        PersonId, RotationTemplateId, RunBundle, RunId, SolverConfig,
    };
    use chrono::NaiveDate;

    fn empty_bundle() -> RunBundle {
        RunBundle {
            interval: DateInterval::new(
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            ),
            people: vec![],
            blocks: vec![],
            templates: vec![],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().build().unwrap(),
        }
    }

    #[test]
    fn faculty_call_preload_is_skipped() {
        let store = MemStore::new();
        let mut bundle = empty_bundle();
        let block = BlockId::new();
        let person = PersonId::new();
        let template = RotationTemplateId::new();
        bundle.preloads.push(Preload {
            assignment: Assignment::new(block, person, template, AssignmentRole::Primary),
            kind: PreloadKind::FacultyCall,
        });
        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        run(&mut state).unwrap();
        assert!(store.find_assignment(block, person).is_none());
    }

    #[test]
    fn non_faculty_call_preload_is_committed_locked() {
        let store = MemStore::new();
        let mut bundle = empty_bundle();
        let block = BlockId::new();
        let person = PersonId::new();
        let template = RotationTemplateId::new();
        bundle.preloads.push(Preload {
            assignment: Assignment::new(block, person, template, AssignmentRole::Primary),
            kind: PreloadKind::Inpatient,
        });
        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        run(&mut state).unwrap();
        let committed = store.find_assignment(block, person).unwrap();
        assert!(committed.is_locked());
    }
}
