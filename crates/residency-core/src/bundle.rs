//! RunBundle: the input bundle that enters the pipeline (spec §6,
//! "Run bundle (input)").

use crate::absence::Absence;
use crate::block::Block;
use crate::person::Person;
use crate::rotation_template::RotationTemplate;
use crate::schedule_run::{Algorithm, DateInterval};
use serde::{Deserialize, Serialize};

/// Solver configuration accumulated by the pipeline and finalized once
/// (Design Notes, "Builder for solver configuration").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    algorithm: Algorithm,
    timeout_secs: u64,
    seed: u64,
    candidates_per_iteration: u32,
}

impl SolverConfig {
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn candidates_per_iteration(&self) -> u32 {
        self.candidates_per_iteration
    }

    pub fn with_timeout_secs(&self, timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            ..self.clone()
        }
    }

    pub fn with_algorithm(&self, algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..self.clone()
        }
    }

    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolverConfigBuilder {
    algorithm: Algorithm,
    timeout_secs: u64,
    seed: u64,
    candidates_per_iteration: u32,
}

impl Default for SolverConfigBuilder {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Greedy,
            timeout_secs: 30,
            seed: 0,
            candidates_per_iteration: 1,
        }
    }
}

impl SolverConfigBuilder {
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn candidates_per_iteration(mut self, n: u32) -> Self {
        self.candidates_per_iteration = n;
        self
    }

    /// Finalize, validating the accumulated parameters.
    pub fn build(self) -> crate::error::CoreResult<SolverConfig> {
        if self.timeout_secs == 0 {
            return Err(crate::error::CoreError::InvalidInvariant(
                "solver timeout must be > 0".into(),
            ));
        }
        if self.candidates_per_iteration == 0 {
            return Err(crate::error::CoreError::InvalidInvariant(
                "candidates_per_iteration must be > 0".into(),
            ));
        }
        Ok(SolverConfig {
            algorithm: self.algorithm,
            timeout_secs: self.timeout_secs,
            seed: self.seed,
            candidates_per_iteration: self.candidates_per_iteration,
        })
    }
}

/// The family a preloaded assignment belongs to, so the pipeline's
/// preload step (§4.1 step 1) can skip faculty-call preloads while
/// loading everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreloadKind {
    Inpatient,
    FmitCall,
    InpatientClinic,
    ResidentCall,
    SupervisionModule,
    FacultyCall,
}

/// An existing assignment supplied by the caller rather than produced by
/// a solver — e.g. a previously-scheduled inpatient rotation. Preloads
/// are always committed locked (§4.1 step 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preload {
    pub assignment: crate::assignment::Assignment,
    pub kind: PreloadKind,
}

/// The input bundle that enters the Pipeline: people, blocks, rotation
/// templates, existing preloads, absences, and a solver configuration,
/// scoped to a requested date interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBundle {
    pub interval: DateInterval,
    pub people: Vec<Person>,
    pub blocks: Vec<Block>,
    pub templates: Vec<RotationTemplate>,
    pub absences: Vec<Absence>,
    pub preloads: Vec<Preload>,
    pub solver_config: SolverConfig,
}
