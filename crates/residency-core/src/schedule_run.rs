//! ScheduleRun: an attempt to generate a schedule for a date interval.

use crate::ids::RunId;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Partial,
    Failed,
}

/// A closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Greedy,
    CpSat,
    Ilp,
    Hybrid,
}

/// Relative-share metrics recorded against a run, e.g. call distribution
/// shares used by the equity counters in Person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelativeShareMetrics {
    pub sunday_call_share: f64,
    pub weekday_call_share: f64,
    pub fmit_week_share: f64,
}

/// An attempt to generate a schedule for a date interval. Created before
/// pipeline invocation, mutated only by status transitions, retained for
/// audit (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRun {
    id: RunId,
    interval: DateInterval,
    algorithm: Algorithm,
    status: RunStatus,
    created_at: chrono::DateTime<Utc>,
    started_at: Option<chrono::DateTime<Utc>>,
    finished_at: Option<chrono::DateTime<Utc>>,
    metrics: RelativeShareMetrics,
}

impl ScheduleRun {
    pub fn new(interval: DateInterval, algorithm: Algorithm) -> Self {
        Self {
            id: RunId::new(),
            interval,
            algorithm,
            status: RunStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            metrics: RelativeShareMetrics::default(),
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn interval(&self) -> DateInterval {
        self.interval
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn metrics(&self) -> &RelativeShareMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut RelativeShareMetrics {
        &mut self.metrics
    }

    /// Status transitions are the only permitted mutation after creation.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn finish(&mut self, status: RunStatus) {
        debug_assert!(
            matches!(status, RunStatus::Success | RunStatus::Partial | RunStatus::Failed),
            "finish() requires a terminal status"
        );
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}
