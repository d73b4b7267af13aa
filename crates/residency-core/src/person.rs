//! Person entity: faculty members and residents.

use crate::error::{CoreError, CoreResult};
use crate::ids::PersonId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a Person is a resident or a faculty member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonKind {
    Faculty,
    Resident,
}

/// Postgraduate year, residents only (1-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PgyLevel(u8);

impl PgyLevel {
    pub fn new(level: u8) -> CoreResult<Self> {
        if (1..=3).contains(&level) {
            Ok(Self(level))
        } else {
            Err(CoreError::InvalidInvariant(format!(
                "pgy-level must be 1-3, got {level}"
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Faculty role tags. A faculty member may hold more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FacultyRole {
    ProgramDirector,
    AssistantPd,
    OfficerInCharge,
    DepartmentChief,
    SportsMedicine,
    CoreFaculty,
}

impl FacultyRole {
    /// Weekly clinic limit derived from role: (0,1,2,2,0,4).
    pub fn weekly_clinic_limit(&self) -> u32 {
        match self {
            FacultyRole::ProgramDirector => 0,
            FacultyRole::AssistantPd => 1,
            FacultyRole::OfficerInCharge => 2,
            FacultyRole::DepartmentChief => 2,
            FacultyRole::SportsMedicine => 0,
            FacultyRole::CoreFaculty => 4,
        }
    }

    /// Block-clinic limit derived from role: (0,4,8,8,0,16) hard max.
    pub fn block_clinic_limit(&self) -> u32 {
        match self {
            FacultyRole::ProgramDirector => 0,
            FacultyRole::AssistantPd => 4,
            FacultyRole::OfficerInCharge => 8,
            FacultyRole::DepartmentChief => 8,
            FacultyRole::SportsMedicine => 0,
            FacultyRole::CoreFaculty => 16,
        }
    }
}

/// Equity counters tracked per person for fair call/FMIT distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCounters {
    pub sunday_call_count: u32,
    pub weekday_call_count: u32,
    pub fmit_week_count: u32,
}

/// A faculty member or resident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    kind: PersonKind,
    pgy_level: Option<PgyLevel>,
    faculty_roles: BTreeSet<FacultyRole>,
    specialties: BTreeSet<String>,
    active: bool,
    equity: EquityCounters,
}

impl Person {
    /// Construct a resident. `pgy_level` is validated (1-3).
    pub fn new_resident(pgy_level: u8, specialties: BTreeSet<String>) -> CoreResult<Self> {
        Ok(Self {
            id: PersonId::new(),
            kind: PersonKind::Resident,
            pgy_level: Some(PgyLevel::new(pgy_level)?),
            faculty_roles: BTreeSet::new(),
            specialties,
            active: true,
            equity: EquityCounters::default(),
        })
    }

    /// Construct a faculty member. At least one role tag is required so
    /// that clinic-limit derivation is always well-defined.
    pub fn new_faculty(
        roles: BTreeSet<FacultyRole>,
        specialties: BTreeSet<String>,
    ) -> CoreResult<Self> {
        if roles.is_empty() {
            return Err(CoreError::InvalidInvariant(
                "faculty must have at least one role tag".into(),
            ));
        }
        Ok(Self {
            id: PersonId::new(),
            kind: PersonKind::Faculty,
            pgy_level: None,
            faculty_roles: roles,
            specialties,
            active: true,
            equity: EquityCounters::default(),
        })
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn kind(&self) -> PersonKind {
        self.kind
    }

    pub fn is_resident(&self) -> bool {
        self.kind == PersonKind::Resident
    }

    pub fn is_faculty(&self) -> bool {
        self.kind == PersonKind::Faculty
    }

    pub fn pgy_level(&self) -> Option<PgyLevel> {
        self.pgy_level
    }

    pub fn faculty_roles(&self) -> &BTreeSet<FacultyRole> {
        &self.faculty_roles
    }

    pub fn specialties(&self) -> &BTreeSet<String> {
        &self.specialties
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn equity(&self) -> EquityCounters {
        self.equity
    }

    pub fn equity_mut(&mut self) -> &mut EquityCounters {
        &mut self.equity
    }

    /// Combined weekly clinic limit across all held roles (max, not sum —
    /// a person holding two roles is bound by the more permissive one).
    pub fn weekly_clinic_limit(&self) -> u32 {
        self.faculty_roles
            .iter()
            .map(FacultyRole::weekly_clinic_limit)
            .max()
            .unwrap_or(0)
    }

    /// Combined block-clinic hard-max limit across all held roles.
    pub fn block_clinic_limit(&self) -> u32 {
        self.faculty_roles
            .iter()
            .map(FacultyRole::block_clinic_limit)
            .max()
            .unwrap_or(0)
    }

    /// Holds an active credential for the named procedure. Credentialing
    /// itself is out of scope; this is a simple specialty-set membership
    /// check used by the validator's procedure-credential rule.
    pub fn holds_credential(&self, procedure: &str) -> bool {
        self.active && self.specialties.contains(procedure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resident_requires_valid_pgy() {
        assert!(Person::new_resident(4, BTreeSet::new()).is_err());
        assert!(Person::new_resident(0, BTreeSet::new()).is_err());
        assert!(Person::new_resident(2, BTreeSet::new()).is_ok());
    }

    #[test]
    fn faculty_requires_at_least_one_role() {
        assert!(Person::new_faculty(BTreeSet::new(), BTreeSet::new()).is_err());
    }

    #[test]
    fn faculty_clinic_limits_match_role_table() {
        let mut roles = BTreeSet::new();
        roles.insert(FacultyRole::CoreFaculty);
        let p = Person::new_faculty(roles, BTreeSet::new()).unwrap();
        assert_eq!(p.weekly_clinic_limit(), 4);
        assert_eq!(p.block_clinic_limit(), 16);
    }

    #[test]
    fn multi_role_faculty_takes_max_limit() {
        let mut roles = BTreeSet::new();
        roles.insert(FacultyRole::ProgramDirector);
        roles.insert(FacultyRole::CoreFaculty);
        let p = Person::new_faculty(roles, BTreeSet::new()).unwrap();
        assert_eq!(p.weekly_clinic_limit(), 4);
    }
}
