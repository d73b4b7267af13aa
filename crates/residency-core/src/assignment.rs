//! Assignment entity: a (block, person, template) triple.

use crate::ids::{AssignmentId, BlockId, PersonId, RotationTemplateId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentRole {
    Primary,
    Backup,
    Supervision,
}

/// A (block, person, template) triple. Assignments hold back-references
/// to Block, Person, and RotationTemplate by identifier, never by
/// exclusive ownership (Design Notes, "Back-references instead of
/// cycles").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    id: AssignmentId,
    block: BlockId,
    person: PersonId,
    template: RotationTemplateId,
    role: AssignmentRole,
    notes: Option<String>,
    version: u32,
    /// An assignment referring to a locked preload may not be overwritten
    /// by later pipeline steps (see §4.1 steps 1 and 4).
    locked: bool,
}

impl Assignment {
    pub fn new(
        block: BlockId,
        person: PersonId,
        template: RotationTemplateId,
        role: AssignmentRole,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            block,
            person,
            template,
            role,
            notes: None,
            version: 0,
            locked: false,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Override the freshly-minted random id with a caller-supplied one.
    /// Used by solvers to derive a reproducible id from the solve seed
    /// instead of OS entropy (P7: structurally equal results for
    /// identical inputs and seed).
    pub fn with_id(mut self, id: AssignmentId) -> Self {
        self.id = id;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn id(&self) -> AssignmentId {
        self.id
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn person(&self) -> PersonId {
        self.person
    }

    pub fn template(&self) -> RotationTemplateId {
        self.template
    }

    pub fn role(&self) -> AssignmentRole {
        self.role
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Bump the optimistic-concurrency version counter. Used when a store
    /// applies a successful mutating write to an existing assignment.
    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    /// The (block, person) key uniqueness is enforced over (P4).
    pub fn key(&self) -> (BlockId, PersonId) {
        (self.block, self.person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_assignment_is_not_locked_and_version_zero() {
        let a = Assignment::new(
            BlockId::new(),
            PersonId::new(),
            RotationTemplateId::new(),
            AssignmentRole::Primary,
        );
        assert!(!a.is_locked());
        assert_eq!(a.version(), 0);
    }

    #[test]
    fn locked_builder_marks_locked() {
        let a = Assignment::new(
            BlockId::new(),
            PersonId::new(),
            RotationTemplateId::new(),
            AssignmentRole::Primary,
        )
        .locked();
        assert!(a.is_locked());
    }
}
