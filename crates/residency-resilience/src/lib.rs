//! Resilience & Homeostasis Engine (spec §4.5, §4.6): utilization
//! monitoring, defense-in-depth posture, N-1/N-2 contingency analysis,
//! pre-computed fallback activation, load-shedding, an optional
//! spin-glass diversity check, and the five-loop homeostasis service,
//! wired together by a MAPE-K tick actor.
//!
//! Grounded on the teacher's `knhk-autonomic` crate for the tick actor's
//! Monitor/Analyze/Plan/Execute/Knowledge shape; the queueing, defense,
//! contingency, fallback, sacrifice, and homeostasis math itself has no
//! teacher counterpart and is built fresh against the data records
//! already defined in `residency-core::resilience_records` and
//! `residency-core::feedback_loop`.

pub mod contingency;
pub mod defense;
pub mod error;
pub mod fallback;
pub mod homeostasis;
pub mod sacrifice;
pub mod spinglass;
pub mod tick;
pub mod utilization;

pub use contingency::{analyze as analyze_contingency, ContingencyReport};
pub use defense::{baseline_shedding_level, defense_level};
pub use error::{ResilienceError, ResilienceResult};
pub use fallback::FallbackScheduler;
pub use homeostasis::{
    AllostasisState, HomeostasisService, ACGME_COMPLIANCE, COVERAGE_RATE, FACULTY_UTILIZATION,
    SCHEDULE_STABILITY, WORKLOAD_BALANCE,
};
pub use sacrifice::SacrificeHierarchy;
pub use spinglass::SpinGlassModel;
pub use tick::{TickActor, TickInput};
pub use utilization::{erlang_c, expected_queue_length, expected_wait, utilization_level, UtilizationMonitor, UtilizationSnapshot};
