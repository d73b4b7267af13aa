//! Read-only context the validator's rule families check against.
//!
//! The validator is pure and side-effect-free (spec §4.3, P6): `validate`
//! takes `&ValidationContext`, never `&mut`, and every rule function
//! below only reads from it.

use residency_core::{Absence, Assignment, Block, DateInterval, Person, RotationTemplate};

pub struct ValidationContext<'a> {
    pub interval: DateInterval,
    pub assignments: &'a [Assignment],
    pub people: &'a [Person],
    pub templates: &'a [RotationTemplate],
    pub blocks: &'a [Block],
    pub absences: &'a [Absence],
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        interval: DateInterval,
        assignments: &'a [Assignment],
        people: &'a [Person],
        templates: &'a [RotationTemplate],
        blocks: &'a [Block],
        absences: &'a [Absence],
    ) -> Self {
        Self {
            interval,
            assignments,
            people,
            templates,
            blocks,
            absences,
        }
    }

    pub fn person(&self, id: residency_core::PersonId) -> Option<&Person> {
        self.people.iter().find(|p| p.id() == id)
    }

    pub fn template(&self, id: residency_core::RotationTemplateId) -> Option<&RotationTemplate> {
        self.templates.iter().find(|t| t.id() == id)
    }

    pub fn block(&self, id: residency_core::BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn assignments_for(&self, person: residency_core::PersonId) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.person() == person).collect()
    }
}
