//! Abstract persistence layer.
//!
//! Spec §1 treats the persistence mechanism as an external collaborator,
//! "modelled as an abstract store". Callers depend on the [`Store`] trait;
//! this crate ships one in-memory implementation ([`MemStore`]) good
//! enough for CLI runs and tests. A real backend (sled, postgres, ...)
//! would live in its own crate implementing the same trait.

use crate::absence::Absence;
use crate::assignment::Assignment;
use crate::block::Block;
use crate::error::{CoreError, CoreResult};
use crate::ids::{AbsenceId, AssignmentId, BlockId, PersonId, RotationTemplateId};
use crate::person::Person;
use crate::resilience_records::{
    FallbackActivation, PositiveFeedbackRisk, ResilienceEvent, ResilienceHealthCheck,
    SacrificeDecision, VulnerabilityRecord,
};
use crate::rotation_template::RotationTemplate;
use crate::schedule_run::ScheduleRun;
use dashmap::DashMap;
use std::sync::Arc;

/// Persistence contract used by the pipeline, loop, and resilience engine.
/// Every method is synchronous: the CORE is single-threaded per invocation
/// (§5), so a blocking in-process map suffices for the reference
/// implementation while still modelling the seams a real store would need.
pub trait Store: Send + Sync {
    fn put_person(&self, person: Person) -> CoreResult<()>;
    fn get_person(&self, id: PersonId) -> CoreResult<Person>;
    fn list_people(&self) -> Vec<Person>;

    fn put_block(&self, block: Block) -> CoreResult<()>;
    fn get_block(&self, id: BlockId) -> CoreResult<Block>;
    fn list_blocks(&self) -> Vec<Block>;

    fn put_template(&self, template: RotationTemplate) -> CoreResult<()>;
    fn get_template(&self, id: RotationTemplateId) -> CoreResult<RotationTemplate>;

    fn put_absence(&self, absence: Absence) -> CoreResult<()>;
    fn list_absences(&self) -> Vec<Absence>;
    fn absence_id(&self, id: AbsenceId) -> Option<Absence>;

    /// Insert or replace an assignment, enforcing the (block, person)
    /// uniqueness invariant (P4) and the locked-preload invariant.
    fn upsert_assignment(&self, assignment: Assignment) -> CoreResult<()>;
    fn get_assignment(&self, id: AssignmentId) -> CoreResult<Assignment>;
    fn find_assignment(&self, block: BlockId, person: PersonId) -> Option<Assignment>;
    fn list_assignments(&self) -> Vec<Assignment>;
    fn assignments_for_person(&self, person: PersonId) -> Vec<Assignment>;

    fn put_run(&self, run: ScheduleRun) -> CoreResult<()>;
    fn get_run(&self, id: crate::ids::RunId) -> CoreResult<ScheduleRun>;

    fn append_health_check(&self, check: ResilienceHealthCheck);
    fn append_resilience_event(&self, event: ResilienceEvent);
    fn append_sacrifice_decision(&self, decision: SacrificeDecision);
    fn append_fallback_activation(&self, activation: FallbackActivation);
    fn append_vulnerability(&self, record: VulnerabilityRecord);
    fn append_positive_feedback_risk(&self, risk: PositiveFeedbackRisk);

    fn health_checks(&self) -> Vec<ResilienceHealthCheck>;
    fn resilience_events(&self) -> Vec<ResilienceEvent>;
    fn sacrifice_decisions(&self) -> Vec<SacrificeDecision>;
    fn fallback_activations(&self) -> Vec<FallbackActivation>;
    fn vulnerabilities(&self) -> Vec<VulnerabilityRecord>;
    fn positive_feedback_risks(&self) -> Vec<PositiveFeedbackRisk>;
}

/// In-memory `Store` backed by `DashMap`s, good for CLI runs and tests.
/// Uniqueness and lock invariants are enforced on write; reads never fail
/// except on missing keys (`NotFound`).
#[derive(Default)]
pub struct MemStore {
    people: DashMap<PersonId, Person>,
    blocks: DashMap<BlockId, Block>,
    templates: DashMap<RotationTemplateId, RotationTemplate>,
    absences: DashMap<AbsenceId, Absence>,
    assignments: DashMap<AssignmentId, Assignment>,
    assignment_index: DashMap<(BlockId, PersonId), AssignmentId>,
    runs: DashMap<crate::ids::RunId, ScheduleRun>,
    health_checks: parking_lot::Mutex<Vec<ResilienceHealthCheck>>,
    resilience_events: parking_lot::Mutex<Vec<ResilienceEvent>>,
    sacrifice_decisions: parking_lot::Mutex<Vec<SacrificeDecision>>,
    fallback_activations: parking_lot::Mutex<Vec<FallbackActivation>>,
    vulnerabilities: parking_lot::Mutex<Vec<VulnerabilityRecord>>,
    positive_feedback_risks: parking_lot::Mutex<Vec<PositiveFeedbackRisk>>,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl Store for MemStore {
    fn put_person(&self, person: Person) -> CoreResult<()> {
        self.people.insert(person.id(), person);
        Ok(())
    }

    fn get_person(&self, id: PersonId) -> CoreResult<Person> {
        self.people
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| CoreError::NotFound(format!("person {id}")))
    }

    fn list_people(&self) -> Vec<Person> {
        self.people.iter().map(|r| r.clone()).collect()
    }

    fn put_block(&self, block: Block) -> CoreResult<()> {
        self.blocks.insert(block.id(), block);
        Ok(())
    }

    fn get_block(&self, id: BlockId) -> CoreResult<Block> {
        self.blocks
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| CoreError::NotFound(format!("block {id}")))
    }

    fn list_blocks(&self) -> Vec<Block> {
        self.blocks.iter().map(|r| r.clone()).collect()
    }

    fn put_template(&self, template: RotationTemplate) -> CoreResult<()> {
        self.templates.insert(template.id(), template);
        Ok(())
    }

    fn get_template(&self, id: RotationTemplateId) -> CoreResult<RotationTemplate> {
        self.templates
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| CoreError::NotFound(format!("template {id}")))
    }

    fn put_absence(&self, absence: Absence) -> CoreResult<()> {
        self.absences.insert(absence.id(), absence);
        Ok(())
    }

    fn list_absences(&self) -> Vec<Absence> {
        self.absences.iter().map(|r| r.clone()).collect()
    }

    fn absence_id(&self, id: AbsenceId) -> Option<Absence> {
        self.absences.get(&id).map(|r| r.clone())
    }

    fn upsert_assignment(&self, assignment: Assignment) -> CoreResult<()> {
        let key = assignment.key();
        if let Some(existing_id) = self.assignment_index.get(&key) {
            let existing = self
                .assignments
                .get(&existing_id)
                .map(|r| r.clone())
                .expect("index/table desync");
            if existing.id() != assignment.id() {
                if existing.is_locked() {
                    return Err(CoreError::AssignmentLocked(existing.id().to_string()));
                }
                // Replacing a different assignment at the same slot: drop
                // the old row so the index points at exactly one id.
                self.assignments.remove(&existing.id());
            }
        }
        self.assignment_index.insert(key, assignment.id());
        self.assignments.insert(assignment.id(), assignment);
        Ok(())
    }

    fn get_assignment(&self, id: AssignmentId) -> CoreResult<Assignment> {
        self.assignments
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| CoreError::NotFound(format!("assignment {id}")))
    }

    fn find_assignment(&self, block: BlockId, person: PersonId) -> Option<Assignment> {
        self.assignment_index
            .get(&(block, person))
            .and_then(|id| self.assignments.get(&id).map(|r| r.clone()))
    }

    fn list_assignments(&self) -> Vec<Assignment> {
        self.assignments.iter().map(|r| r.clone()).collect()
    }

    fn assignments_for_person(&self, person: PersonId) -> Vec<Assignment> {
        self.assignments
            .iter()
            .filter(|r| r.person() == person)
            .map(|r| r.clone())
            .collect()
    }

    fn put_run(&self, run: ScheduleRun) -> CoreResult<()> {
        self.runs.insert(run.id(), run);
        Ok(())
    }

    fn get_run(&self, id: crate::ids::RunId) -> CoreResult<ScheduleRun> {
        self.runs
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| CoreError::NotFound(format!("run {id}")))
    }

    fn append_health_check(&self, check: ResilienceHealthCheck) {
        self.health_checks.lock().push(check);
    }

    fn append_resilience_event(&self, event: ResilienceEvent) {
        self.resilience_events.lock().push(event);
    }

    fn append_sacrifice_decision(&self, decision: SacrificeDecision) {
        self.sacrifice_decisions.lock().push(decision);
    }

    fn append_fallback_activation(&self, activation: FallbackActivation) {
        self.fallback_activations.lock().push(activation);
    }

    fn append_vulnerability(&self, record: VulnerabilityRecord) {
        self.vulnerabilities.lock().push(record);
    }

    fn append_positive_feedback_risk(&self, risk: PositiveFeedbackRisk) {
        self.positive_feedback_risks.lock().push(risk);
    }

    fn health_checks(&self) -> Vec<ResilienceHealthCheck> {
        self.health_checks.lock().clone()
    }

    fn resilience_events(&self) -> Vec<ResilienceEvent> {
        self.resilience_events.lock().clone()
    }

    fn sacrifice_decisions(&self) -> Vec<SacrificeDecision> {
        self.sacrifice_decisions.lock().clone()
    }

    fn fallback_activations(&self) -> Vec<FallbackActivation> {
        self.fallback_activations.lock().clone()
    }

    fn vulnerabilities(&self) -> Vec<VulnerabilityRecord> {
        self.vulnerabilities.lock().clone()
    }

    fn positive_feedback_risks(&self) -> Vec<PositiveFeedbackRisk> {
        self.positive_feedback_risks.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentRole;
    use std::collections::BTreeSet;

    #[test]
    fn upsert_rejects_overwrite_of_locked_slot_by_a_different_assignment() {
        let store = MemStore::new();
        let person = Person::new_resident(1, BTreeSet::new()).unwrap();
        let pid = person.id();
        store.put_person(person).unwrap();
        let block = BlockId::new();
        let template = RotationTemplateId::new();

        let locked = Assignment::new(block, pid, template, AssignmentRole::Primary).locked();
        store.upsert_assignment(locked).unwrap();

        let other = Assignment::new(block, pid, template, AssignmentRole::Primary);
        let err = store.upsert_assignment(other).unwrap_err();
        assert!(matches!(err, CoreError::AssignmentLocked(_)));
    }

    #[test]
    fn find_assignment_round_trips_by_key() {
        let store = MemStore::new();
        let block = BlockId::new();
        let person = PersonId::new();
        let template = RotationTemplateId::new();
        let a = Assignment::new(block, person, template, AssignmentRole::Primary);
        let id = a.id();
        store.upsert_assignment(a).unwrap();
        let found = store.find_assignment(block, person).unwrap();
        assert_eq!(found.id(), id);
    }
}
