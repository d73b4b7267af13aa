//! Constraint objects and violation records (spec §2, "Constraint
//! Framework"). Consumed by `residency-pipeline` (hard-constraint
//! checks during generation) and `residency-validator` (the §4.3
//! duty-hour/supervision ruleset, which reuses [`Violation`]).

pub mod constraint;
pub mod violation;

pub use constraint::{Constraint, ConstraintContext, ConstraintSet, UniquenessConstraint};
pub use violation::{violation_penalty, Severity, Violation, ViolationKind};
