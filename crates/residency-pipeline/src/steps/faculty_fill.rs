//! Step 6: faculty half-day fill (spec §4.1).
//!
//! Every faculty member ends this step with exactly one assignment per
//! half-day block in the interval (P2: 56 per 28-day block). Fill
//! policy, checked in priority order per block/person pair:
//!   1. an existing assignment is preserved;
//!   2. a weekend block gets the weekend placeholder;
//!   3. a blocking absence covering the date gets the leave placeholder;
//!   4. a federal-holiday block gets the holiday placeholder;
//!   5. otherwise, the admin placeholder.

use crate::{PipelineError, PipelineResult, PipelineState};
use residency_core::{Assignment, AssignmentRole, PlaceholderKind};

pub fn run(state: &mut PipelineState) -> PipelineResult<()> {
    let faculty: Vec<_> = state
        .bundle
        .people
        .iter()
        .filter(|p| p.is_faculty() && p.is_active())
        .map(|p| p.id())
        .collect();
    let absences = state.bundle.absences.clone();
    let blocks = state.bundle.blocks.clone();

    for block in &blocks {
        for &person in &faculty {
            if state.store.find_assignment(block.id(), person).is_some() {
                continue;
            }

            let kind = if block.is_weekend() {
                PlaceholderKind::Weekend
            } else if absences
                .iter()
                .any(|a| a.person() == person && a.is_blocking() && a.covers(block.date()))
            {
                PlaceholderKind::Leave
            } else if block.is_holiday() {
                PlaceholderKind::Holiday
            } else {
                PlaceholderKind::Admin
            };

            let template = state.placeholders.for_kind(kind, block.time_of_day()).id();
            let assignment = Assignment::new(block.id(), person, template, AssignmentRole::Primary);
            state
                .store
                .upsert_assignment(assignment)
                .map_err(PipelineError::Core)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_core::{
        Absence, Block, DateInterval, FacultyRole, MemStore, Person, RunBundle, RunId,
        SolverConfig, TimeOfDay,
    };
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn twenty_eight_day_bundle() -> (RunBundle, residency_core::PersonId) {
        let faculty = Person::new_faculty(
            [FacultyRole::CoreFaculty].into_iter().collect(),
            BTreeSet::new(),
        )
        .unwrap();
        let fid = faculty.id();
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = start + chrono::Duration::days(27);
        let mut blocks = Vec::new();
        let mut d = start;
        while d <= end {
            blocks.push(Block::new(d, TimeOfDay::Am, 0, false));
            blocks.push(Block::new(d, TimeOfDay::Pm, 0, false));
            d += chrono::Duration::days(1);
        }
        let bundle = RunBundle {
            interval: DateInterval::new(start, end),
            people: vec![faculty],
            blocks,
            templates: vec![],
            absences: vec![],
            preloads: vec![],
            solver_config: SolverConfig::builder().build().unwrap(),
        };
        (bundle, fid)
    }

    #[test]
    fn faculty_ends_with_exactly_56_assignments_per_28_day_block() {
        let (bundle, fid) = twenty_eight_day_bundle();
        let store = MemStore::new();
        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        run(&mut state).unwrap();
        assert_eq!(store.assignments_for_person(fid).len(), 56);
    }

    #[test]
    fn blocking_absence_yields_leave_placeholder() {
        let (mut bundle, fid) = twenty_eight_day_bundle();
        let day = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        bundle.absences.push(Absence::new(fid, day, day, true));
        let store = MemStore::new();
        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        run(&mut state).unwrap();

        let block = state
            .bundle
            .blocks
            .iter()
            .find(|b| b.date() == day && b.time_of_day() == TimeOfDay::Am)
            .unwrap();
        let assignment = store.find_assignment(block.id(), fid).unwrap();
        let leave = state
            .placeholders
            .for_kind(PlaceholderKind::Leave, TimeOfDay::Am);
        assert_eq!(assignment.template(), leave.id());
    }

    #[test]
    fn existing_assignment_is_preserved() {
        let (bundle, fid) = twenty_eight_day_bundle();
        let store = MemStore::new();
        let block = bundle.blocks[0].id();
        let template = residency_core::RotationTemplateId::new();
        let existing = residency_core::Assignment::new(block, fid, template, AssignmentRole::Primary);
        store.upsert_assignment(existing.clone()).unwrap();

        let mut state = PipelineState::new(store.clone(), bundle, RunId::new());
        run(&mut state).unwrap();

        let found = store.find_assignment(block, fid).unwrap();
        assert_eq!(found.template(), template);
    }
}
