//! Step 4: PCAT/day-off synchronization (spec §4.1).
//!
//! For each new `CallAssignment` produced by the call solver (step 3),
//! immediately create one PCAT assignment (next day, AM) and one day-off
//! assignment (next day, PM), both marked LOCKED so the activity solver
//! (step 5) can observe PCAT as supervision capacity without ever being
//! able to overwrite either slot (P3).

use crate::{PipelineError, PipelineResult, PipelineState};
use residency_core::{
    ActivityKind, Assignment, AssignmentRole, Block, RotationTemplate, RotationTemplateId,
    TimeOfDay,
};
use std::collections::HashMap;

/// Reuse a bundle-supplied template matching `abbreviation`, or synthesize
/// one. Mirrors the fallback pattern in `call_solver`/`expansion`.
fn find_or_synth(
    state: &PipelineState,
    abbreviation: &str,
    kind: ActivityKind,
    category: &str,
) -> RotationTemplateId {
    state
        .bundle
        .templates
        .iter()
        .find(|t| t.abbreviation() == abbreviation)
        .map(|t| t.id())
        .unwrap_or_else(|| RotationTemplate::new(abbreviation, abbreviation, kind, category).id())
}

pub fn run(state: &mut PipelineState) -> PipelineResult<()> {
    let pcat_template = find_or_synth(state, "PCAT", ActivityKind::Supervision, "pcat");
    let day_off_template = find_or_synth(state, "DO", ActivityKind::Admin, "day-off");

    let blocks_by_date_tod: HashMap<_, &Block> = state
        .bundle
        .blocks
        .iter()
        .map(|b| ((b.date(), b.time_of_day()), b))
        .collect();

    for call in state.new_call_assignments.clone() {
        let next_day = call.next_day();

        if let Some(&am_block) = blocks_by_date_tod.get(&(next_day, TimeOfDay::Am)) {
            let pcat = Assignment::new(
                am_block.id(),
                call.person(),
                pcat_template,
                AssignmentRole::Supervision,
            )
            .locked();
            state
                .store
                .upsert_assignment(pcat)
                .map_err(PipelineError::Core)?;
        }

        if let Some(&pm_block) = blocks_by_date_tod.get(&(next_day, TimeOfDay::Pm)) {
            let day_off = Assignment::new(
                pm_block.id(),
                call.person(),
                day_off_template,
                AssignmentRole::Primary,
            )
            .locked();
            state
                .store
                .upsert_assignment(day_off)
                .map_err(PipelineError::Core)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_core::{
        CallAssignment, DateInterval, MemStore, RotationTemplateId, RunBundle, RunId,
        SolverConfig,
    };
    use chrono::NaiveDate;

    fn bundle_with_blocks(start: NaiveDate, days: i64) -> RunBundle {
        let mut blocks = Vec::new();
        for i in 0..days {
            let d = start + chrono::Duration::days(i);
            blocks.push(Block::new(d, TimeOfDay::Am, 0, false));
            blocks.push(Block::new(d, TimeOfDay::Pm, 0, false));
        }
        RunBundle {
            interval: DateInterval::new(start, start + chrono::Duration::days(days - 1)),
            people: vec![],
            blocks,
            templates: vec![],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().build().unwrap(),
        }
    }

    #[test]
    fn call_assignment_implies_locked_pcat_and_day_off_next_day() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let bundle = bundle_with_blocks(start, 3);
        let store = MemStore::new();
        let person = residency_core::PersonId::new();
        let call = CallAssignment::new(
            bundle.blocks[0].id(),
            person,
            RotationTemplateId::new(),
            start,
        );

        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        state.new_call_assignments.push(call);
        run(&mut state).unwrap();

        let next_day = start + chrono::Duration::days(1);
        let am = state
            .bundle
            .blocks
            .iter()
            .find(|b| b.date() == next_day && b.time_of_day() == TimeOfDay::Am)
            .unwrap();
        let pm = state
            .bundle
            .blocks
            .iter()
            .find(|b| b.date() == next_day && b.time_of_day() == TimeOfDay::Pm)
            .unwrap();

        let pcat = store.find_assignment(am.id(), person).unwrap();
        let day_off = store.find_assignment(pm.id(), person).unwrap();
        assert!(pcat.is_locked());
        assert!(day_off.is_locked());
    }
}
