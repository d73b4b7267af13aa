//! Top-level crate tying together the scheduling pipeline, the
//! autonomous improvement loop, and the resilience engine.
//!
//! This crate is a thin umbrella: the actual subsystems live in their
//! own workspace members (`residency-core`, `residency-pipeline`,
//! `residency-validator`, `residency-loop`, `residency-resilience`,
//! `residency-concurrency`, `residency-constraints`, `residency-solver`).
//! Re-exporting them here gives downstream consumers (and the
//! `residency-scheduler` binary) a single crate to depend on.

pub use residency_concurrency as concurrency;
pub use residency_constraints as constraints;
pub use residency_core as core;
pub use residency_loop as improvement_loop;
pub use residency_pipeline as pipeline;
pub use residency_resilience as resilience;
pub use residency_solver as solver;
pub use residency_validator as validator;
