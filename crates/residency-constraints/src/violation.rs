//! Violation records shared by the constraint framework, the pipeline's
//! hard-constraint checks, and the validator (spec §4.3, §6 "Violation
//! report").

use residency_core::PersonId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity weight used by the loop's violation-penalty term (§4.4).
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 2.0,
            Severity::High => 4.0,
            Severity::Critical => 8.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    WeeklyHoursCeiling,
    OneInSeven,
    ConsecutiveDutyCap,
    SupervisionRatio,
    ProcedureCredential,
    Uniqueness,
    AbsenceRespect,
    PlaceholderFillRequired,
    SolverTimeout,
    Other,
}

/// A single violation record: `{type, severity, person-identifier-or-null,
/// message, evidence}` (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub person: Option<PersonId>,
    pub message: String,
    pub evidence: serde_json::Value,
}

impl Violation {
    pub fn new(kind: ViolationKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            person: None,
            message: message.into(),
            evidence: serde_json::Value::Null,
        }
    }

    pub fn for_person(mut self, person: PersonId) -> Self {
        self.person = Some(person);
        self
    }

    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Severity-weighted sum used by the loop's scalar score formula (§4.4).
pub fn violation_penalty(violations: &[Violation]) -> f64 {
    violations.iter().map(|v| v.severity.weight()).sum()
}
