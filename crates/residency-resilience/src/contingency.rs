//! Contingency Analyzer (spec §4.5.3): N-1 and N-2 loss simulation over
//! the faculty roster, surfacing which single or paired losses would
//! break supervision coverage.
//!
//! Grounded on the same pattern the validator already uses for
//! supervision-ratio checking (`residency-validator::rules`): rather
//! than duplicating that logic, the analyzer re-runs the real
//! `Validator` against a context with the candidate faculty's
//! assignments removed, the way an N-1 drill removes a unit from
//! service and re-checks the board.

use chrono::{DateTime, Utc};
use residency_core::{Assignment, Person, PersonId, VulnerabilityRecord};
use residency_validator::{ValidationContext, ValidationReport, Validator};
use uuid::Uuid;

/// Whether removing `missing` from the roster keeps the schedule in
/// compliance. Reuses the real validator so the fatality judgment tracks
/// whatever rule families it enforces, rather than a second copy of the
/// supervision-ratio logic.
fn remains_compliant(ctx: &ValidationContext<'_>, missing: &[PersonId]) -> ValidationReport {
    let filtered: Vec<Assignment> = ctx
        .assignments
        .iter()
        .filter(|a| !missing.contains(&a.person()))
        .cloned()
        .collect();
    let remaining_people: Vec<Person> = ctx
        .people
        .iter()
        .filter(|p| !missing.contains(&p.id()))
        .cloned()
        .collect();
    let sub_ctx = ValidationContext::new(
        ctx.interval,
        &filtered,
        &remaining_people,
        ctx.templates,
        ctx.blocks,
        ctx.absences,
    );
    Validator::default().validate(&sub_ctx)
}

/// Fraction of all assignments held by `person`, used as a crude
/// centrality proxy for ranking "most critical" faculty.
fn centrality(ctx: &ValidationContext<'_>, person: PersonId) -> f64 {
    if ctx.assignments.is_empty() {
        return 0.0;
    }
    let held = ctx.assignments.iter().filter(|a| a.person() == person).count();
    held as f64 / ctx.assignments.len() as f64
}

#[derive(Debug, Clone)]
pub struct ContingencyReport {
    pub n1: Vec<VulnerabilityRecord>,
    pub n2: Vec<VulnerabilityRecord>,
    pub n1_pass: bool,
    pub n2_pass: bool,
    pub most_critical: Option<PersonId>,
}

/// Run the N-1 (single-loss) and N-2 (paired-loss) drills over every
/// faculty member in `ctx`. `baseline` is the report for the schedule as
/// it actually stands; a candidate loss is "fatal" if it turns a
/// compliant baseline non-compliant.
pub fn analyze(ctx: &ValidationContext<'_>, baseline: &ValidationReport, now: DateTime<Utc>) -> ContingencyReport {
    let faculty: Vec<&Person> = ctx.people.iter().filter(|p| p.is_faculty() && p.is_active()).collect();

    let mut n1 = Vec::new();
    for person in &faculty {
        let report = remains_compliant(ctx, &[person.id()]);
        let fatal = baseline.compliance && !report.compliance;
        if fatal || report.total_violations > baseline.total_violations {
            n1.push(VulnerabilityRecord {
                id: Uuid::new_v4(),
                recorded_at: now,
                person_ids: vec![person.id().to_string()],
                fatal,
                centrality: centrality(ctx, person.id()),
                detail: format!(
                    "loss of {} raises violations from {} to {}",
                    person.id(),
                    baseline.total_violations,
                    report.total_violations
                ),
            });
        }
    }

    let mut n2 = Vec::new();
    for i in 0..faculty.len() {
        for j in (i + 1)..faculty.len() {
            let a = faculty[i];
            let b = faculty[j];
            let report = remains_compliant(ctx, &[a.id(), b.id()]);
            let fatal = baseline.compliance && !report.compliance;
            if fatal || report.total_violations > baseline.total_violations {
                n2.push(VulnerabilityRecord {
                    id: Uuid::new_v4(),
                    recorded_at: now,
                    person_ids: vec![a.id().to_string(), b.id().to_string()],
                    fatal,
                    centrality: (centrality(ctx, a.id()) + centrality(ctx, b.id())) / 2.0,
                    detail: format!(
                        "paired loss of {} and {} raises violations from {} to {}",
                        a.id(),
                        b.id(),
                        baseline.total_violations,
                        report.total_violations
                    ),
                });
            }
        }
    }

    let most_critical = n1
        .iter()
        .max_by(|a, b| a.centrality.partial_cmp(&b.centrality).unwrap())
        .and_then(|v| v.person_ids.first())
        .and_then(|s| s.parse::<Uuid>().ok())
        .map(PersonId::from_uuid);

    ContingencyReport {
        n1_pass: n1.iter().all(|v| !v.fatal),
        n2_pass: n2.iter().all(|v| !v.fatal),
        n1,
        n2,
        most_critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use residency_core::{Assignment, AssignmentRole, Block, BlockId, DateInterval, RotationTemplate, TimeOfDay};
    use residency_validator::ValidationContext;
    use std::collections::BTreeSet;

    fn mk_block() -> Block {
        Block::new(chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), TimeOfDay::Am, 1, false)
    }

    #[test]
    fn roster_with_no_faculty_has_no_vulnerabilities() {
        let interval = DateInterval::new(
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        );
        let people = vec![];
        let assignments = vec![];
        let templates = vec![];
        let blocks = vec![];
        let absences = vec![];
        let ctx = ValidationContext::new(interval, &assignments, &people, &templates, &blocks, &absences);
        let baseline = Validator::default().validate(&ctx);
        let report = analyze(&ctx, &baseline, Utc::now());
        assert!(report.n1.is_empty());
        assert!(report.n2.is_empty());
        assert!(report.n1_pass && report.n2_pass);
    }

    #[test]
    fn sole_supervising_faculty_is_a_fatal_n1_vulnerability() {
        let interval = DateInterval::new(
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        );

        let mut roles = BTreeSet::new();
        roles.insert(residency_core::FacultyRole::CoreFaculty);
        let faculty = Person::new_faculty(roles, BTreeSet::new()).unwrap();
        let resident = Person::new_resident(1, BTreeSet::new()).unwrap();

        let block = mk_block();
        let block_id = block.id();
        let clinic_template = RotationTemplate::new("RC", "RC", residency_core::ActivityKind::Clinic, "resident-clinic");
        let supervision_template =
            RotationTemplate::new("SUP", "SUP", residency_core::ActivityKind::Supervision, "resident-clinic");

        let resident_assignment =
            Assignment::new(block_id, resident.id(), clinic_template.id(), AssignmentRole::Primary);
        let faculty_assignment =
            Assignment::new(block_id, faculty.id(), supervision_template.id(), AssignmentRole::Primary);

        let people = vec![faculty.clone(), resident];
        let assignments = vec![resident_assignment, faculty_assignment];
        let templates = vec![clinic_template, supervision_template];
        let blocks = vec![block];
        let absences = vec![];

        let ctx = ValidationContext::new(interval, &assignments, &people, &templates, &blocks, &absences);
        let baseline = Validator::default().validate(&ctx);
        let report = analyze(&ctx, &baseline, Utc::now());

        assert!(report.n1.iter().any(|v| v.person_ids == vec![faculty.id().to_string()]));
    }
}
