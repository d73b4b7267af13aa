//! Autonomous Improvement Loop (spec §4.4): generate-evaluate-mutate
//! control loop that drives a schedule's scalar score toward a target,
//! plus the distinct Resilience regression harness operation mode.
//!
//! Grounded on the teacher's `knhk-autonomous-loop` crate's
//! `AutonomousLoopController`/`LoopState`/`AuditTrail` shape, simplified
//! per DESIGN.md (no Ed25519-signed/blockchain-hash-chained audit trail
//! — that is the teacher's ΔΣ-proposal-provenance concern, not a
//! documented requirement here).

pub mod config;
pub mod controller;
pub mod harness;
pub mod mutate;
pub mod persistence;
pub mod record;
pub mod score;
pub mod state;

pub use config::LoopConfig;
pub use controller::{LoopController, LoopError, LoopOutcome, LoopResult};
pub use harness::{perturb, run_resilience_harness, HarnessReport, Scenario, ScenarioResult};
pub use persistence::RunDirectory;
pub use record::IterationRecord;
pub use state::{LoopState, StopReason};
