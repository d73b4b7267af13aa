//! Dispatch table mapping [`residency_core::Algorithm`] to a [`Solver`]
//! implementation (Design Notes, "Pluggable solver back-ends behind one
//! trait").

use crate::cpsat::CpSatSolver;
use crate::greedy::GreedySolver;
use crate::hybrid::HybridSolver;
use crate::ilp::IlpSolver;
use crate::{SolveContext, SolveParams, Solver, SolverResult};
use residency_constraints::ConstraintSet;
use residency_core::Algorithm;

pub fn solve(
    algorithm: Algorithm,
    context: &SolveContext,
    constraints: &ConstraintSet,
    params: SolveParams,
) -> SolverResult {
    match algorithm {
        Algorithm::Greedy => GreedySolver.solve(context, constraints, params),
        Algorithm::CpSat => CpSatSolver::default().solve(context, constraints, params),
        Algorithm::Ilp => IlpSolver.solve(context, constraints, params),
        Algorithm::Hybrid => HybridSolver.solve(context, constraints, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_all_algorithms_without_panicking() {
        let ctx = SolveContext {
            demand: vec![],
            existing: vec![],
        };
        let constraints = ConstraintSet::new();
        let params = SolveParams {
            timeout_secs: 1,
            seed: 7,
        };
        for algo in [
            Algorithm::Greedy,
            Algorithm::CpSat,
            Algorithm::Ilp,
            Algorithm::Hybrid,
        ] {
            let result = solve(algo, &ctx, &constraints, params);
            assert!(result.assignments.is_empty());
        }
    }
}
