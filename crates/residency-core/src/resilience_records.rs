//! Resilience & homeostasis audit entities (spec §3, §4.5, §6 "Resilience
//! audit tables"). These are plain data records; the engine that produces
//! them lives in `residency-resilience`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UtilizationLevel {
    Green,
    Yellow,
    Orange,
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenseLevel {
    Prevention,
    Control,
    SafetySystems,
    Containment,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadSheddingLevel {
    Normal,
    Yellow,
    Orange,
    Red,
    Black,
    Critical,
}

/// A point-in-time snapshot of system health (spec §3,
/// "ResilienceHealthCheck").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceHealthCheck {
    pub id: Uuid,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub utilization_level: UtilizationLevel,
    pub defense_level: DefenseLevel,
    pub load_shedding_level: LoadSheddingLevel,
    pub n1_pass: bool,
    pub n2_pass: bool,
    pub active_fallback_tags: Vec<String>,
    pub crisis: bool,
    pub metrics: serde_json::Value,
}

/// A generic audit row for a resilience state transition that does not
/// warrant its own typed table (used by the tick actor for lower-severity
/// events).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceEvent {
    pub id: Uuid,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub kind: String,
    pub message: String,
    pub metrics: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SacrificeMethod {
    Automatic,
    Manual,
    EmergencyOverride,
}

/// An audit record of a load-shedding transition (spec §3,
/// "SacrificeDecision").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SacrificeDecision {
    pub id: Uuid,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub from_level: LoadSheddingLevel,
    pub to_level: LoadSheddingLevel,
    pub reason: String,
    pub activities_suspended: Vec<String>,
    pub activities_protected: Vec<String>,
    pub approver: String,
    pub method: SacrificeMethod,
    pub recovered_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// An audit record of a pre-computed fallback schedule being activated
/// (spec §3, "FallbackActivation"; P10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackActivation {
    pub id: Uuid,
    pub scenario_tag: String,
    pub activated_at: chrono::DateTime<chrono::Utc>,
    pub assignment_count: usize,
    pub coverage_rate: f64,
    pub deactivated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub deactivation_reason: Option<String>,
}

impl FallbackActivation {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// P10: activation-time <= deactivation-time whenever both are set.
    pub fn respects_ordering(&self) -> bool {
        match self.deactivated_at {
            Some(d) => self.activated_at <= d,
            None => true,
        }
    }
}

/// A single-loss or paired-loss vulnerability surfaced by the contingency
/// analyzer (§4.5.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub id: Uuid,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    pub person_ids: Vec<String>,
    pub fatal: bool,
    pub centrality: f64,
    pub detail: String,
}

/// Severity of a positive-feedback-loop risk (spec §4.6: "raises them as
/// risk records with severity").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// A detected positive-feedback chain: a correction fired against
/// `trigger_loop` was followed by a worsening deviation on
/// `affected_loop` (spec §4.6, "chains of corrections where one
/// correction demonstrably worsens another loop's deviation").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositiveFeedbackRisk {
    pub id: Uuid,
    pub detected_at: chrono::DateTime<chrono::Utc>,
    pub trigger_loop: String,
    pub affected_loop: String,
    pub baseline_deviation: f64,
    pub worsened_deviation: f64,
    pub severity: RiskSeverity,
}
