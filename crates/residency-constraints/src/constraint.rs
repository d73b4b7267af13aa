//! Generic constraint objects (spec §2, "Constraint Framework").
//!
//! Constraints are checked synchronously against a snapshot of the
//! in-progress assignment set so that solvers remain deterministic given
//! identical input (P7) — unlike the teacher's async
//! `Constraint::check(...) -> Pin<Box<dyn Future<...>>>` (suited to an
//! I/O-bound workflow engine), this framework has no suspension points.

use crate::violation::Violation;
use residency_core::{Assignment, AssignmentId, BlockId, PersonId};
use std::collections::HashMap;

/// A read-only view of in-progress pipeline/solver state that constraint
/// objects check against. `by_slot` indexes committed assignments by
/// (block, person) for O(1) collision checks.
pub struct ConstraintContext<'a> {
    pub assignments: &'a [Assignment],
    pub by_slot: HashMap<(BlockId, PersonId), AssignmentId>,
}

impl<'a> ConstraintContext<'a> {
    pub fn new(assignments: &'a [Assignment]) -> Self {
        let by_slot = assignments
            .iter()
            .map(|a| (a.key(), a.id()))
            .collect();
        Self {
            assignments,
            by_slot,
        }
    }

    pub fn occupied(&self, block: BlockId, person: PersonId) -> bool {
        self.by_slot.contains_key(&(block, person))
    }
}

/// A hard or soft constraint evaluated over a [`ConstraintContext`].
/// Hard constraints abort the pipeline on violation (§4.1, "Failure
/// semantics"); soft constraints are enumerated in the violation report.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this constraint is hard (aborts the pipeline) or soft
    /// (reported only).
    fn is_hard(&self) -> bool;

    /// Evaluate the constraint, returning any violations found.
    fn check(&self, ctx: &ConstraintContext<'_>) -> Vec<Violation>;
}

/// P4: no two assignments may share (block, person).
pub struct UniquenessConstraint;

impl Constraint for UniquenessConstraint {
    fn name(&self) -> &str {
        "uniqueness"
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn check(&self, ctx: &ConstraintContext<'_>) -> Vec<Violation> {
        use crate::violation::{Severity, ViolationKind};
        let mut seen: HashMap<(BlockId, PersonId), usize> = HashMap::new();
        let mut violations = Vec::new();
        for a in ctx.assignments {
            let count = seen.entry(a.key()).or_insert(0);
            *count += 1;
            if *count > 1 {
                violations.push(
                    Violation::new(
                        ViolationKind::Uniqueness,
                        Severity::Critical,
                        format!("duplicate assignment for block/person pair"),
                    )
                    .for_person(a.person()),
                );
            }
        }
        violations
    }
}

/// A lightweight ordered collection of constraints, evaluated in
/// registration order (soft constraints don't interrupt evaluation; a
/// hard-constraint violation is still reported, but callers check
/// [`ConstraintSet::has_hard_violation`] to decide whether to abort).
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, constraint: Box<dyn Constraint>) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn evaluate(&self, ctx: &ConstraintContext<'_>) -> Vec<Violation> {
        self.constraints.iter().flat_map(|c| c.check(ctx)).collect()
    }

    pub fn has_hard_violation(&self, ctx: &ConstraintContext<'_>) -> bool {
        self.constraints
            .iter()
            .filter(|c| c.is_hard())
            .any(|c| !c.check(ctx).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use residency_core::{AssignmentRole, RotationTemplateId};

    #[test]
    fn uniqueness_constraint_flags_duplicate_slot() {
        let block = BlockId::new();
        let person = PersonId::new();
        let template = RotationTemplateId::new();
        let a1 = Assignment::new(block, person, template, AssignmentRole::Primary);
        let a2 = Assignment::new(block, person, template, AssignmentRole::Primary);
        let assignments = vec![a1, a2];
        let ctx = ConstraintContext::new(&assignments);
        let violations = UniquenessConstraint.check(&ctx);
        assert_eq!(violations.len(), 1);
    }
}
