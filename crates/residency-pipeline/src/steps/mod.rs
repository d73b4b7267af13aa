//! The six ordered pipeline steps (spec §4.1). Each step is a plain
//! function taking the shared [`crate::PipelineState`]; `lib.rs` enforces
//! the call order via [`crate::PipelineState::begin_step`].

pub mod activity_solver;
pub mod call_solver;
pub mod expansion;
pub mod faculty_fill;
pub mod pcat_sync;
pub mod preload;
