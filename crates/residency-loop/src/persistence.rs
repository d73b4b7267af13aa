//! Per-run persistence layout (spec §4.4, §6 "Per-run persistence
//! layout").
//!
//! Five artifacts per run directory: `state` (current loop state),
//! `history` (newline-delimited [`IterationRecord`]s — the teacher's
//! `AuditTrail` convention), `schedule` (best assignments), `report`
//! (best validation output), `log` (a plain-text execution trace).
//! Resumption reads `state`+`history` back and continues from the next
//! iteration — this crate decided the on-disk formats (spec.md leaves
//! them open; see DESIGN.md).

use crate::record::IterationRecord;
use crate::state::LoopState;
use residency_core::Assignment;
use residency_validator::ValidationReport;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    pub fn new(runs_root: impl AsRef<Path>, run_id: residency_core::RunId) -> Self {
        Self {
            path: runs_root.as_ref().join(run_id.to_string()),
        }
    }

    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state_path(&self) -> PathBuf {
        self.path.join("state")
    }

    fn history_path(&self) -> PathBuf {
        self.path.join("history")
    }

    fn schedule_path(&self) -> PathBuf {
        self.path.join("schedule")
    }

    fn report_path(&self) -> PathBuf {
        self.path.join("report")
    }

    fn log_path(&self) -> PathBuf {
        self.path.join("log")
    }

    pub fn write_state(&self, state: &LoopState) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        fs::write(self.state_path(), json)
    }

    pub fn read_state(&self) -> io::Result<LoopState> {
        let bytes = fs::read(self.state_path())?;
        serde_json::from_slice(&bytes).map_err(io::Error::from)
    }

    pub fn state_exists(&self) -> bool {
        self.state_path().exists()
    }

    pub fn append_history(&self, record: &IterationRecord) -> io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(self.history_path())?;
        file.write_all(line.as_bytes())
    }

    pub fn read_history(&self) -> io::Result<Vec<IterationRecord>> {
        let path = self.history_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(path)?;
        io::BufReader::new(file)
            .lines()
            .filter(|l| l.as_ref().map(|s| !s.is_empty()).unwrap_or(true))
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line).map_err(io::Error::from)
            })
            .collect()
    }

    pub fn write_schedule(&self, assignments: &[Assignment]) -> io::Result<()> {
        fs::write(self.schedule_path(), serde_json::to_vec_pretty(assignments)?)
    }

    pub fn write_report(&self, report: &ValidationReport) -> io::Result<()> {
        fs::write(self.report_path(), serde_json::to_vec_pretty(report)?)
    }

    pub fn append_log(&self, line: impl AsRef<str>) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(self.log_path())?;
        writeln!(file, "{}", line.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoopConfig;
    use chrono::Utc;
    use residency_core::{Algorithm, RunId, RunStatus, SolverConfig};

    #[test]
    fn state_and_history_round_trip_through_a_temp_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let run_id = RunId::new();
        let run_dir = RunDirectory::new(dir.path(), run_id);
        run_dir.ensure().unwrap();

        let state = LoopState {
            run_id,
            next_iteration: 3,
            best_score: 0.82,
            stagnation_counter: 1,
            solver_config: SolverConfig::builder().build().unwrap(),
            config: LoopConfig::default(),
            stop_reason: None,
        };
        run_dir.write_state(&state).unwrap();
        let read = run_dir.read_state().unwrap();
        assert_eq!(read.next_iteration, 3);
        assert_eq!(read.run_id, run_id);

        let record = IterationRecord {
            iteration: 1,
            recorded_at: Utc::now(),
            status: RunStatus::Success,
            algorithm: Algorithm::Greedy,
            timeout_secs: 30,
            seed: 0,
            coverage_rate: 1.0,
            compliance_score: 1.0,
            violation_penalty: 0.0,
            score: 0.9,
            is_best_so_far: true,
            stagnation_counter: 0,
        };
        run_dir.append_history(&record).unwrap();
        run_dir.append_history(&record).unwrap();
        let history = run_dir.read_history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].iteration, 1);
    }

    #[test]
    fn state_exists_is_false_before_the_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = RunDirectory::new(dir.path(), RunId::new());
        assert!(!run_dir.state_exists());
    }
}
