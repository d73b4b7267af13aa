//! Step 2: expansion (spec §4.1).
//!
//! Expands resident block assignments from rotation templates into
//! per-person, per-block demand slots for the activity solver (step 5).
//! A resident already covered by a locked preload or a blocking absence
//! is skipped — those blocks are someone else's (or nobody's) to fill.
//!
//! Open Question resolution (see `DESIGN.md`): the source's rotation
//! template assignment (which specific template a resident is expected
//! in for a given block) is out of this spec's data model detail, so
//! expansion targets the generic resident-clinic activity for every
//! otherwise-open weekday block, to be matched against supervision
//! capacity by the activity solver.

use crate::{PipelineResult, PipelineState};
use residency_core::{ActivityKind, Block, PersonId, RotationTemplate};
use residency_solver::DemandSlot;

/// Find (or synthesize, once per run) the resident-clinic template id
/// used for expansion demand. Bundles are expected to carry a clinic
/// template; if none is present we fall back to a synthetic one so the
/// pipeline can still run against minimal test bundles.
fn resident_clinic_template(state: &PipelineState) -> residency_core::RotationTemplateId {
    state
        .bundle
        .templates
        .iter()
        .find(|t| t.activity_kind() == ActivityKind::Clinic)
        .map(|t| t.id())
        .unwrap_or_else(|| {
            RotationTemplate::new("RES-CLINIC", "RES-CLINIC", ActivityKind::Clinic, "clinic").id()
        })
}

pub fn run(state: &mut PipelineState) -> PipelineResult<()> {
    let template = resident_clinic_template(state);
    let absences = state.bundle.absences.clone();
    let locked_blocks: std::collections::HashSet<_> = state
        .store
        .list_assignments()
        .into_iter()
        .filter(|a| a.is_locked())
        .map(|a| a.key())
        .collect();

    let residents: Vec<PersonId> = state
        .bundle
        .people
        .iter()
        .filter(|p| p.is_resident() && p.is_active())
        .map(|p| p.id())
        .collect();

    let mut demand = Vec::new();
    for block in weekday_blocks(&state.bundle.blocks) {
        for &resident in &residents {
            if locked_blocks.contains(&(block.id(), resident)) {
                continue;
            }
            let blocked = absences
                .iter()
                .any(|a| a.person() == resident && a.is_blocking() && a.covers(block.date()));
            if blocked {
                continue;
            }
            demand.push(DemandSlot {
                block: block.id(),
                template,
                eligible_people: vec![resident],
            });
        }
    }

    state.resident_demand = Some(demand);
    Ok(())
}

fn weekday_blocks(blocks: &[Block]) -> impl Iterator<Item = &Block> {
    blocks.iter().filter(|b| !b.is_weekend())
}
