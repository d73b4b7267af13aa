//! Absence entity: a person-dated interval with a blocking flag.

use crate::ids::{AbsenceId, PersonId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A person-dated interval. When `blocking`, it prevents assignment on
/// overlapping blocks and substitutes the leave placeholder during fill
/// (§4.1 step 6, P5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Absence {
    id: AbsenceId,
    person: PersonId,
    start: NaiveDate,
    end: NaiveDate,
    blocking: bool,
}

impl Absence {
    pub fn new(person: PersonId, start: NaiveDate, end: NaiveDate, blocking: bool) -> Self {
        Self {
            id: AbsenceId::new(),
            person,
            start,
            end,
            blocking,
        }
    }

    pub fn id(&self) -> AbsenceId {
        self.id
    }

    pub fn person(&self) -> PersonId {
        self.person
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Inclusive overlap test against a calendar date (a Block's date).
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_is_inclusive_on_both_ends() {
        let a = Absence::new(
            PersonId::new(),
            NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
            true,
        );
        assert!(a.covers(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()));
        assert!(a.covers(NaiveDate::from_ymd_opt(2026, 8, 9).unwrap()));
        assert!(!a.covers(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()));
    }
}
