//! Pure duty-hour and supervision validator (spec §4.3).
//!
//! `Validator::validate` takes a [`ValidationContext`] by shared
//! reference and returns a [`ValidationReport`] — it never mutates the
//! schedule, never touches a [`residency_core::Store`], and calling it
//! twice on the same input yields identical output (P6). Each of the
//! five required rule families lives in [`rules`] as a standalone pure
//! function so they can be tested, and composed, independently.

pub mod context;
pub mod report;
pub mod rules;

pub use context::ValidationContext;
pub use report::ValidationReport;

/// Stateless entry point; holds no fields today but keeps the door open
/// for configurable rule toggles (e.g. an institution-specific weekly
/// hours ceiling) without changing the call site.
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(skip_all, fields(people = ctx.people.len(), assignments = ctx.assignments.len()))]
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationReport {
        let mut violations = Vec::new();
        violations.extend(rules::weekly_hours_ceiling(ctx));
        violations.extend(rules::one_in_seven(ctx));
        violations.extend(rules::consecutive_duty_cap(ctx));
        violations.extend(rules::absence_respect(ctx));
        violations.extend(rules::procedure_credentials(ctx));

        let (supervision_violations, covered, required) = rules::supervision_ratio(ctx);
        violations.extend(supervision_violations);

        let coverage_rate = if required == 0 { 1.0 } else { covered as f64 / required as f64 };

        let report = ValidationReport::new(coverage_rate, violations);
        tracing::debug!(
            compliance = report.compliance,
            total_violations = report.total_violations,
            coverage_rate,
            "validation complete"
        );
        report
    }
}
