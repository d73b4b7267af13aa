//! RotationTemplate entity: a typed activity slot, including the
//! reserved placeholder templates used by faculty half-day fill (§4.1
//! step 6).

use crate::ids::RotationTemplateId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    Clinic,
    Inpatient,
    Call,
    Absence,
    Supervision,
    Admin,
}

/// A typed activity slot that an Assignment refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationTemplate {
    id: RotationTemplateId,
    abbreviation: String,
    display_abbreviation: String,
    activity_kind: ActivityKind,
    category: String,
}

impl RotationTemplate {
    pub fn new(
        abbreviation: impl Into<String>,
        display_abbreviation: impl Into<String>,
        activity_kind: ActivityKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: RotationTemplateId::new(),
            abbreviation: abbreviation.into(),
            display_abbreviation: display_abbreviation.into(),
            activity_kind,
            category: category.into(),
        }
    }

    pub fn id(&self) -> RotationTemplateId {
        self.id
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn display_abbreviation(&self) -> &str {
        &self.display_abbreviation
    }

    pub fn activity_kind(&self) -> ActivityKind {
        self.activity_kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_placeholder(&self) -> bool {
        PlaceholderKind::from_abbreviation(&self.abbreviation).is_some()
    }
}

/// The eight reserved placeholder abbreviations from spec §3. Each
/// placeholder comes in an AM/PM pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    Admin,
    Weekend,
    Leave,
    Holiday,
}

impl PlaceholderKind {
    pub fn from_abbreviation(abbr: &str) -> Option<Self> {
        match abbr {
            "GME-AM" | "GME-PM" => Some(Self::Admin),
            "W-AM" | "W-PM" => Some(Self::Weekend),
            "LV-AM" | "LV-PM" => Some(Self::Leave),
            "HOL-AM" | "HOL-PM" => Some(Self::Holiday),
            _ => None,
        }
    }

    /// Build the reserved template for this placeholder at the given
    /// time-of-day. Templates are constructed fresh; callers that need a
    /// single stable identifier per placeholder should cache these via
    /// [`PlaceholderRegistry`].
    pub fn abbreviation(&self, time_of_day: crate::block::TimeOfDay) -> &'static str {
        use crate::block::TimeOfDay::{Am, Pm};
        match (self, time_of_day) {
            (Self::Admin, Am) => "GME-AM",
            (Self::Admin, Pm) => "GME-PM",
            (Self::Weekend, Am) => "W-AM",
            (Self::Weekend, Pm) => "W-PM",
            (Self::Leave, Am) => "LV-AM",
            (Self::Leave, Pm) => "LV-PM",
            (Self::Holiday, Am) => "HOL-AM",
            (Self::Holiday, Pm) => "HOL-PM",
        }
    }
}

/// A stable per-run set of the eight placeholder templates, so the
/// pipeline's faculty half-day fill step can reference a single
/// `RotationTemplateId` per placeholder abbreviation instead of minting a
/// new template each time it fills a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderRegistry {
    admin_am: RotationTemplate,
    admin_pm: RotationTemplate,
    weekend_am: RotationTemplate,
    weekend_pm: RotationTemplate,
    leave_am: RotationTemplate,
    leave_pm: RotationTemplate,
    holiday_am: RotationTemplate,
    holiday_pm: RotationTemplate,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        use crate::block::TimeOfDay::{Am, Pm};
        let build = |kind: PlaceholderKind, tod| {
            RotationTemplate::new(
                kind.abbreviation(tod),
                kind.abbreviation(tod),
                ActivityKind::Admin,
                "placeholder",
            )
        };
        Self {
            admin_am: build(PlaceholderKind::Admin, Am),
            admin_pm: build(PlaceholderKind::Admin, Pm),
            weekend_am: build(PlaceholderKind::Weekend, Am),
            weekend_pm: build(PlaceholderKind::Weekend, Pm),
            leave_am: build(PlaceholderKind::Leave, Am),
            leave_pm: build(PlaceholderKind::Leave, Pm),
            holiday_am: build(PlaceholderKind::Holiday, Am),
            holiday_pm: build(PlaceholderKind::Holiday, Pm),
        }
    }

    /// All eight reserved templates, so a caller building a
    /// [`residency_validator::ValidationContext`] after a pipeline run can
    /// extend the bundle's own templates with the ones the run minted
    /// internally (faculty half-day fill, PCAT/DO sync) — otherwise the
    /// validator can't resolve their ids and treats every placeholder
    /// assignment as an ordinary duty block.
    pub fn all(&self) -> [RotationTemplate; 8] {
        [
            self.admin_am.clone(),
            self.admin_pm.clone(),
            self.weekend_am.clone(),
            self.weekend_pm.clone(),
            self.leave_am.clone(),
            self.leave_pm.clone(),
            self.holiday_am.clone(),
            self.holiday_pm.clone(),
        ]
    }

    pub fn for_kind(&self, kind: PlaceholderKind, time_of_day: crate::block::TimeOfDay) -> &RotationTemplate {
        use crate::block::TimeOfDay::{Am, Pm};
        match (kind, time_of_day) {
            (PlaceholderKind::Admin, Am) => &self.admin_am,
            (PlaceholderKind::Admin, Pm) => &self.admin_pm,
            (PlaceholderKind::Weekend, Am) => &self.weekend_am,
            (PlaceholderKind::Weekend, Pm) => &self.weekend_pm,
            (PlaceholderKind::Leave, Am) => &self.leave_am,
            (PlaceholderKind::Leave, Pm) => &self.leave_pm,
            (PlaceholderKind::Holiday, Am) => &self.holiday_am,
            (PlaceholderKind::Holiday, Pm) => &self.holiday_pm,
        }
    }
}

impl Default for PlaceholderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_abbreviations_round_trip() {
        assert_eq!(
            PlaceholderKind::from_abbreviation("GME-AM"),
            Some(PlaceholderKind::Admin)
        );
        assert_eq!(PlaceholderKind::from_abbreviation("XYZ"), None);
    }

    #[test]
    fn registry_reuses_stable_ids_per_slot() {
        let reg = PlaceholderRegistry::new();
        let a = reg.for_kind(PlaceholderKind::Holiday, crate::block::TimeOfDay::Am);
        let b = reg.for_kind(PlaceholderKind::Holiday, crate::block::TimeOfDay::Am);
        assert_eq!(a.id(), b.id());
    }
}
