//! CallAssignment: a specialization of Assignment for call duties.
//!
//! Creation of a CallAssignment deterministically implies two follow-up
//! assignments for the next day (PCAT AM, day-off PM), both LOCKED —
//! enforced by the pipeline's PCAT/DO synchronization step (§4.1 step 4,
//! P3), not by this type itself (which only records the call duty).

use crate::assignment::Assignment;
use crate::ids::{AssignmentId, BlockId, PersonId, RotationTemplateId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAssignment {
    assignment: Assignment,
    date: NaiveDate,
}

impl CallAssignment {
    pub fn new(
        block: BlockId,
        person: PersonId,
        template: RotationTemplateId,
        date: NaiveDate,
    ) -> Self {
        use crate::assignment::AssignmentRole;
        Self {
            assignment: Assignment::new(block, person, template, AssignmentRole::Primary),
            date,
        }
    }

    pub fn id(&self) -> AssignmentId {
        self.assignment.id()
    }

    pub fn person(&self) -> PersonId {
        self.assignment.person()
    }

    pub fn block(&self) -> BlockId {
        self.assignment.block()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn into_assignment(self) -> Assignment {
        self.assignment
    }

    /// The calendar date on which the implied PCAT/day-off pair lands.
    pub fn next_day(&self) -> NaiveDate {
        self.date + chrono::Duration::days(1)
    }
}
