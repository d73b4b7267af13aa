//! Layered configuration: defaults -> optional TOML file -> environment
//! (`RESIDENCY_*`), matching the teacher's `config = "0.13"` dependency
//! declared but left unused by `knhk-autonomous-loop`/`knhk-marketplace`
//! — here it is actually wired up via `config::Config::builder()`.
//!
//! CLI flags still win when given explicitly; this layer only supplies
//! the defaults an operator would otherwise have to repeat on every
//! invocation (e.g. a site-wide `target_score` or `runs_path`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub max_iterations: u32,
    pub target_score: f64,
    pub stagnation_limit: u32,
    pub time_limit_secs: u64,
    pub runs_path: String,
    pub harness_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            target_score: 0.95,
            stagnation_limit: 8,
            time_limit_secs: 300,
            runs_path: "./runs".to_string(),
            harness_threshold: 0.8,
        }
    }
}

/// Load `residency-scheduler.toml` from the current directory if present,
/// then apply `RESIDENCY_*` environment overrides. Never fails: a missing
/// or unparsable file/env just falls back to [`AppConfig::default`].
pub fn load() -> AppConfig {
    let defaults = AppConfig::default();
    let built = config::Config::builder()
        .add_source(config::Config::try_from(&defaults).expect("defaults are always representable"))
        .add_source(config::File::with_name("residency-scheduler").required(false))
        .add_source(config::Environment::with_prefix("RESIDENCY"))
        .build();

    match built.and_then(|c| c.try_deserialize()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "falling back to built-in defaults");
            defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_loop_config_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.max_iterations, 50);
        assert!((cfg.target_score - 0.95).abs() < 1e-9);
    }
}
