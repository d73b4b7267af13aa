//! The five required rule families (spec §4.3).
//!
//! Each function is a pure read over a [`ValidationContext`], returning
//! the violations it finds; `validate` (in `lib.rs`) concatenates them.
//! None of these mutate the context — re-running any of them against the
//! same input produces the same output (P6).

use crate::context::ValidationContext;
use chrono::NaiveDate;
use residency_constraints::{Severity, Violation, ViolationKind};
use residency_core::{ActivityKind, AssignmentRole, PersonId};
use std::collections::{HashMap, HashSet};

/// Duty hours contributed by one assignment: a call shift counts as a
/// full 24-hour duty period; a placeholder (admin/weekend/leave/holiday)
/// contributes none; any other half-day assignment counts as 4 hours.
fn duty_hours(ctx: &ValidationContext, assignment: &residency_core::Assignment) -> f64 {
    match ctx.template(assignment.template()) {
        Some(t) if t.is_placeholder() => 0.0,
        Some(t) if t.activity_kind() == ActivityKind::Call => 24.0,
        Some(_) => 4.0,
        None => 4.0,
    }
}

/// Whether `person` has at least one assignment on `date` (either
/// time-of-day); used by the one-in-seven and consecutive-duty checks to
/// decide whether a calendar day counts as "on duty".
fn is_duty_day(ctx: &ValidationContext, person: PersonId, date: NaiveDate) -> bool {
    ctx.assignments.iter().any(|a| {
        a.person() == person
            && ctx
                .block(a.block())
                .map(|b| b.date() == date)
                .unwrap_or(false)
            && ctx
                .template(a.template())
                .map(|t| !t.is_placeholder())
                .unwrap_or(true)
    })
}

fn resident_ids(ctx: &ValidationContext) -> Vec<PersonId> {
    ctx.people.iter().filter(|p| p.is_resident()).map(|p| p.id()).collect()
}

/// weekly-hours ceiling: the 80-hour rule, averaged over 4 weeks.
pub fn weekly_hours_ceiling(ctx: &ValidationContext) -> Vec<Violation> {
    const CEILING: f64 = 80.0;
    let weeks = (ctx.interval.days() as f64 / 7.0).max(1.0);
    let mut violations = Vec::new();

    for person in resident_ids(ctx) {
        let total: f64 = ctx
            .assignments_for(person)
            .into_iter()
            .map(|a| duty_hours(ctx, a))
            .sum();
        let average_weekly = total / weeks;
        if average_weekly > CEILING {
            violations.push(
                Violation::new(
                    ViolationKind::WeeklyHoursCeiling,
                    Severity::Critical,
                    format!("average weekly duty hours {average_weekly:.1} exceeds {CEILING}-hour ceiling"),
                )
                .for_person(person)
                .with_evidence(serde_json::json!({ "average_weekly_hours": average_weekly })),
            );
        }
    }
    violations
}

/// one-in-seven: at least one 24-hour off period per rolling 7-day window.
pub fn one_in_seven(ctx: &ValidationContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let window = 7;

    for person in resident_ids(ctx) {
        let mut day = ctx.interval.start;
        while day <= ctx.interval.end {
            let window_end = (day + chrono::Duration::days(window - 1)).min(ctx.interval.end);
            if window_end < day + chrono::Duration::days(window - 1) {
                break; // partial trailing window, not enough days to require
            }
            let has_off_day = (0..window).any(|offset| {
                let d = day + chrono::Duration::days(offset);
                d <= ctx.interval.end && !is_duty_day(ctx, person, d)
            });
            if !has_off_day {
                violations.push(
                    Violation::new(
                        ViolationKind::OneInSeven,
                        Severity::High,
                        format!("no 24-hour off period in the 7-day window starting {day}"),
                    )
                    .for_person(person),
                );
            }
            day += chrono::Duration::days(1);
        }
    }
    violations
}

/// consecutive-duty cap: no resident may run more than 6 consecutive
/// on-duty calendar days.
pub fn consecutive_duty_cap(ctx: &ValidationContext) -> Vec<Violation> {
    const MAX_CONSECUTIVE_DAYS: i64 = 6;
    let mut violations = Vec::new();

    for person in resident_ids(ctx) {
        let mut streak = 0i64;
        let mut day = ctx.interval.start;
        let mut flagged = false;
        while day <= ctx.interval.end {
            if is_duty_day(ctx, person, day) {
                streak += 1;
                if streak > MAX_CONSECUTIVE_DAYS && !flagged {
                    violations.push(
                        Violation::new(
                            ViolationKind::ConsecutiveDutyCap,
                            Severity::High,
                            format!("on-duty streak exceeded {MAX_CONSECUTIVE_DAYS} consecutive days ending {day}"),
                        )
                        .for_person(person),
                    );
                    flagged = true;
                }
            } else {
                streak = 0;
                flagged = false;
            }
            day += chrono::Duration::days(1);
        }
    }
    violations
}

fn supervising_template_ids(ctx: &ValidationContext) -> HashSet<residency_core::RotationTemplateId> {
    ctx.templates
        .iter()
        .filter(|t| matches!(t.activity_kind(), ActivityKind::Supervision | ActivityKind::Inpatient))
        .map(|t| t.id())
        .collect()
}

/// supervision ratio: every resident-clinic slot must have qualified
/// supervision coverage on the same block (PCAT counts). Returns the
/// violations and the `(covered, required)` tallies for the coverage
/// rate.
pub fn supervision_ratio(ctx: &ValidationContext) -> (Vec<Violation>, usize, usize) {
    let supervising = supervising_template_ids(ctx);
    let covered_blocks: HashSet<residency_core::BlockId> = ctx
        .assignments
        .iter()
        .filter(|a| supervising.contains(&a.template()))
        .map(|a| a.block())
        .collect();

    let clinic_slots: Vec<_> = ctx
        .assignments
        .iter()
        .filter(|a| {
            ctx.person(a.person()).map(|p| p.is_resident()).unwrap_or(false)
                && ctx
                    .template(a.template())
                    .map(|t| t.activity_kind() == ActivityKind::Clinic)
                    .unwrap_or(false)
        })
        .collect();

    let required = clinic_slots.len();
    let mut covered = 0usize;
    let mut violations = Vec::new();
    for slot in clinic_slots {
        if covered_blocks.contains(&slot.block()) {
            covered += 1;
        } else {
            violations.push(
                Violation::new(
                    ViolationKind::SupervisionRatio,
                    Severity::High,
                    "resident clinic slot lacks supervising faculty/PCAT coverage",
                )
                .for_person(slot.person()),
            );
        }
    }
    (violations, covered, required)
}

/// procedure credentials: supervising faculty must hold an active
/// credential for the procedure (the supervised template's category).
pub fn procedure_credentials(ctx: &ValidationContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for assignment in ctx.assignments {
        if assignment.role() != AssignmentRole::Supervision {
            continue;
        }
        let Some(template) = ctx.template(assignment.template()) else {
            continue;
        };
        let procedure = template.category();
        let credentialed = ctx
            .person(assignment.person())
            .map(|p| p.holds_credential(procedure))
            .unwrap_or(false);
        if !credentialed {
            violations.push(
                Violation::new(
                    ViolationKind::ProcedureCredential,
                    Severity::Critical,
                    format!("supervising faculty lacks active credential for '{procedure}'"),
                )
                .for_person(assignment.person())
                .with_evidence(serde_json::json!({ "procedure": procedure })),
            );
        }
    }
    violations
}

/// P5: every blocking absence's overlapping blocks must carry the leave
/// placeholder for that person, not left unfilled or filled otherwise.
pub fn absence_respect(ctx: &ValidationContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let assignment_index: HashMap<_, _> = ctx
        .assignments
        .iter()
        .map(|a| (a.key(), a))
        .collect();

    for absence in ctx.absences.iter().filter(|a| a.is_blocking()) {
        for block in ctx.blocks.iter().filter(|b| absence.covers(b.date())) {
            match assignment_index.get(&(block.id(), absence.person())) {
                Some(a) => {
                    let is_leave = ctx
                        .template(a.template())
                        .map(|t| t.abbreviation().starts_with("LV-"))
                        .unwrap_or(false);
                    if !is_leave {
                        violations.push(
                            Violation::new(
                                ViolationKind::AbsenceRespect,
                                Severity::Medium,
                                "blocking absence not reflected with a leave placeholder",
                            )
                            .for_person(absence.person()),
                        );
                    }
                }
                None => {}
            }
        }
    }
    violations
}
