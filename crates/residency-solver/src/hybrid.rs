//! Hybrid solver: greedy seed followed by cp-sat repair (spec §4.2).
//! The greedy pass fills most slots cheaply; remaining violations feed a
//! second cp-sat pass scoped to only the slots the greedy pass left
//! unfilled, sharing the same seed so the whole pipeline stays
//! deterministic (P7).

use crate::cpsat::CpSatSolver;
use crate::greedy::GreedySolver;
use crate::{DemandSlot, SolveContext, SolveParams, Solver, SolverResult, SolverStatus};
use residency_constraints::ConstraintSet;
use residency_core::BlockId;
use std::collections::HashSet;

pub struct HybridSolver;

impl Solver for HybridSolver {
    fn solve(
        &self,
        context: &SolveContext,
        constraints: &ConstraintSet,
        params: SolveParams,
    ) -> SolverResult {
        let mut seed_result = GreedySolver.solve(context, &ConstraintSet::new(), params);

        let filled: HashSet<BlockId> = seed_result.assignments.iter().map(|a| a.block()).collect();
        let remaining: Vec<DemandSlot> = context
            .demand
            .iter()
            .filter(|d| !filled.contains(&d.block))
            .cloned()
            .collect();

        if remaining.is_empty() {
            return finalize(seed_result, context, constraints);
        }

        let mut existing = context.existing.clone();
        existing.extend(seed_result.assignments.clone());
        let repair_ctx = SolveContext {
            demand: remaining,
            existing,
        };
        let repair_result = CpSatSolver::default().solve(&repair_ctx, &ConstraintSet::new(), params);

        seed_result.assignments.extend(repair_result.assignments);
        seed_result.violations = repair_result.violations;
        seed_result.diagnostics.nodes_explored += repair_result.diagnostics.nodes_explored;
        seed_result.diagnostics.backtracks += repair_result.diagnostics.backtracks;
        seed_result.diagnostics.elapsed_ms += repair_result.diagnostics.elapsed_ms;
        seed_result.status = repair_result.status;

        finalize(seed_result, context, constraints)
    }
}

fn finalize(
    mut result: SolverResult,
    context: &SolveContext,
    constraints: &ConstraintSet,
) -> SolverResult {
    use residency_constraints::ConstraintContext;
    let mut combined = context.existing.clone();
    combined.extend(result.assignments.clone());
    let ctx = ConstraintContext::new(&combined);
    result.violations.extend(constraints.evaluate(&ctx));
    if constraints.has_hard_violation(&ctx) {
        result.status = SolverStatus::Infeasible;
    } else if result.status == SolverStatus::Timeout {
        // keep timeout status
    } else if result.violations.is_empty() {
        result.status = SolverStatus::Optimal;
    } else {
        result.status = SolverStatus::Feasible;
    }
    result
}
