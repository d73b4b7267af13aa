//! Sacrifice Hierarchy / load-shedding (spec §4.5.4): a fixed,
//! most-protected-first ordering of activity categories, escalated or
//! recovered one tier at a time as [`LoadSheddingLevel`] changes.

use chrono::{DateTime, Utc};
use residency_core::{LoadSheddingLevel, SacrificeDecision, SacrificeMethod};
use uuid::Uuid;

/// Activities in most-protected-first order (spec §4.5.5's six named
/// tiers). Each load-shedding tier suspends one additional activity from
/// the expendable end, never touching anything above it in the list.
const HIERARCHY: &[&str] = &[
    "direct patient care",
    "continuity clinics",
    "scheduled procedures",
    "educational conferences",
    "administrative time",
    "quality-improvement projects",
];

fn suspended_count(level: LoadSheddingLevel) -> usize {
    match level {
        LoadSheddingLevel::Normal => 0,
        LoadSheddingLevel::Yellow => 1,
        LoadSheddingLevel::Orange => 2,
        LoadSheddingLevel::Red => 3,
        LoadSheddingLevel::Black => 4,
        LoadSheddingLevel::Critical => 5,
    }
}

pub fn activities_suspended(level: LoadSheddingLevel) -> Vec<String> {
    let n = suspended_count(level);
    HIERARCHY[HIERARCHY.len() - n..].iter().map(|s| s.to_string()).collect()
}

pub fn activities_protected(level: LoadSheddingLevel) -> Vec<String> {
    let n = suspended_count(level);
    HIERARCHY[..HIERARCHY.len() - n].iter().map(|s| s.to_string()).collect()
}

/// Tracks the currently-active load-shedding tier and produces the audit
/// trail of transitions between tiers.
pub struct SacrificeHierarchy {
    current: LoadSheddingLevel,
}

impl Default for SacrificeHierarchy {
    fn default() -> Self {
        Self {
            current: LoadSheddingLevel::Normal,
        }
    }
}

impl SacrificeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> LoadSheddingLevel {
        self.current
    }

    /// Transition to `to`, recording which activities are now suspended
    /// versus protected at the new tier.
    pub fn transition(
        &mut self,
        to: LoadSheddingLevel,
        reason: impl Into<String>,
        approver: impl Into<String>,
        method: SacrificeMethod,
        now: DateTime<Utc>,
    ) -> SacrificeDecision {
        let from = self.current;
        self.current = to;
        SacrificeDecision {
            id: Uuid::new_v4(),
            recorded_at: now,
            from_level: from,
            to_level: to,
            reason: reason.into(),
            activities_suspended: activities_suspended(to),
            activities_protected: activities_protected(to),
            approver: approver.into(),
            method,
            recovered_at: None,
        }
    }

    /// Recover fully to NORMAL, closing out the given decision's audit
    /// record.
    pub fn recover(&mut self, decision: &mut SacrificeDecision, now: DateTime<Utc>) {
        self.current = LoadSheddingLevel::Normal;
        decision.recovered_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_tiers_suspend_a_strict_superset_of_lower_tiers() {
        let levels = [
            LoadSheddingLevel::Normal,
            LoadSheddingLevel::Yellow,
            LoadSheddingLevel::Orange,
            LoadSheddingLevel::Red,
            LoadSheddingLevel::Black,
            LoadSheddingLevel::Critical,
        ];
        let mut previous: Vec<String> = Vec::new();
        for level in levels {
            let suspended = activities_suspended(level);
            assert!(suspended.len() >= previous.len());
            assert!(previous.iter().all(|a| suspended.contains(a)));
            previous = suspended;
        }
    }

    #[test]
    fn critical_protects_only_direct_patient_care() {
        let protected = activities_protected(LoadSheddingLevel::Critical);
        assert_eq!(protected, vec!["direct patient care".to_string()]);
    }

    #[test]
    fn transition_and_recovery_round_trip() {
        let mut hierarchy = SacrificeHierarchy::new();
        let now = Utc::now();
        let mut decision = hierarchy.transition(
            LoadSheddingLevel::Orange,
            "utilization crossed ORANGE",
            "tick-actor",
            SacrificeMethod::Automatic,
            now,
        );
        assert_eq!(decision.from_level, LoadSheddingLevel::Normal);
        assert_eq!(hierarchy.current(), LoadSheddingLevel::Orange);
        assert!(decision.recovered_at.is_none());

        hierarchy.recover(&mut decision, now + chrono::Duration::hours(2));
        assert_eq!(hierarchy.current(), LoadSheddingLevel::Normal);
        assert!(decision.recovered_at.is_some());
    }
}
