//! Command-line entry point: schedule generation via the autonomous
//! improvement loop, and the resilience regression harness.
//!
//! Grounded on the teacher's `knhk-test-cache` binary: a plain
//! `clap::{Parser, Subcommand}` derive CLI, `tracing_subscriber::fmt()`
//! initialized from `RUST_LOG`, and a `#[tokio::main]` entry point. The
//! teacher's own `knhk-cli` crate is not used as the grounding source
//! here — it is built on a proprietary `clap_noun_verb` macro framework
//! that is not a dependency of this workspace.
//!
//! Exposed as a library so both this crate's own binary and the
//! top-level `residency-scheduler` binary can share one entry point.

mod config;
mod demo;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use residency_concurrency::CancelToken;
use residency_core::{Algorithm, RunId};
use residency_loop::{run_resilience_harness, LoopConfig, LoopController, Scenario};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Greedy,
    CpSat,
    Ilp,
    Hybrid,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(a: AlgorithmArg) -> Self {
        match a {
            AlgorithmArg::Greedy => Algorithm::Greedy,
            AlgorithmArg::CpSat => Algorithm::CpSat,
            AlgorithmArg::Ilp => Algorithm::Ilp,
            AlgorithmArg::Hybrid => Algorithm::Hybrid,
        }
    }
}

/// Mirrors `residency_loop::harness::Scenario` — kept as a separate CLI
/// enum (rather than deriving `ValueEnum` on the harness type directly)
/// so `residency-loop` doesn't have to depend on `clap`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    SingleFacultyLoss,
    DoubleFacultyLoss,
    PcsSeason50Percent,
    HolidaySkeleton,
    PandemicEssential,
    MassCasualty,
    WeatherEmergency,
}

impl From<ScenarioArg> for Scenario {
    fn from(s: ScenarioArg) -> Self {
        match s {
            ScenarioArg::SingleFacultyLoss => Scenario::SingleFacultyLoss,
            ScenarioArg::DoubleFacultyLoss => Scenario::DoubleFacultyLoss,
            ScenarioArg::PcsSeason50Percent => Scenario::PcsSeason50Percent,
            ScenarioArg::HolidaySkeleton => Scenario::HolidaySkeleton,
            ScenarioArg::PandemicEssential => Scenario::PandemicEssential,
            ScenarioArg::MassCasualty => Scenario::MassCasualty,
            ScenarioArg::WeatherEmergency => Scenario::WeatherEmergency,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "residency-cli", version, about = "Residency rotation scheduling: generate and harden schedules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the autonomous improvement loop against a demo bundle.
    Generate {
        #[arg(long, value_name = "DATE")]
        start: NaiveDate,
        #[arg(long, value_name = "DATE")]
        end: NaiveDate,

        /// Run against one of the harness's named failure scenarios
        /// instead of the unperturbed demo bundle (spec §6: `generate
        /// --scenario <name> | --resume <run-id>`). Mutually exclusive
        /// with `--resume`.
        #[arg(long, value_enum, conflicts_with = "resume")]
        scenario: Option<ScenarioArg>,

        /// Resume a previously started run instead of starting fresh.
        #[arg(long, value_name = "RUN_ID")]
        resume: Option<uuid::Uuid>,

        #[arg(long, value_enum, default_value_t = AlgorithmArg::Greedy)]
        algorithm: AlgorithmArg,
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        #[arg(long, default_value_t = 1)]
        candidates: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Falls back to the configured default (`residency-scheduler.toml`
        /// or `RESIDENCY_MAX_ITERATIONS`) when omitted.
        #[arg(long)]
        max_iters: Option<u32>,
        #[arg(long)]
        target_score: Option<f64>,
        #[arg(long)]
        stagnation: Option<u32>,
        #[arg(long)]
        time_limit: Option<u64>,

        #[arg(long)]
        runs_path: Option<PathBuf>,

        #[arg(long)]
        json_output: bool,
        #[arg(long)]
        quiet: bool,
    },

    /// Run the seven-scenario resilience regression harness against a
    /// demo bundle and report pass/fail.
    ResilienceHarness {
        #[arg(long, value_name = "DATE")]
        start: NaiveDate,
        #[arg(long, value_name = "DATE")]
        end: NaiveDate,

        #[arg(long, value_enum, default_value_t = AlgorithmArg::Greedy)]
        algorithm: AlgorithmArg,
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        json_output: bool,
    },
}

/// Parse `std::env::args()`, dispatch the requested subcommand, and
/// return the process exit code (0 success, 1 failure, 130 cancelled).
pub async fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let app_config = config::load();

    match cli.command {
        Command::Generate {
            start,
            end,
            scenario,
            resume,
            algorithm,
            timeout,
            candidates,
            seed,
            max_iters,
            target_score,
            stagnation,
            time_limit,
            runs_path,
            json_output,
            quiet,
        } => {
            let mut bundle = demo::demo_bundle(start, end, algorithm.into(), timeout, seed, candidates);
            if let Some(scenario) = scenario {
                bundle = residency_loop::perturb(&bundle, scenario.into());
            }
            let loop_config = LoopConfig {
                max_iterations: max_iters.unwrap_or(app_config.max_iterations),
                target_score: target_score.unwrap_or(app_config.target_score),
                stagnation_limit: stagnation.unwrap_or(app_config.stagnation_limit),
                time_limit: std::time::Duration::from_secs(time_limit.unwrap_or(app_config.time_limit_secs)),
                candidates_per_iteration: candidates,
                ..LoopConfig::default()
            };
            let runs_path = runs_path.unwrap_or_else(|| PathBuf::from(&app_config.runs_path));

            let controller = LoopController::new(runs_path);
            let cancel = controller.cancel_token();
            spawn_ctrl_c_watcher(cancel);

            let run_id = resume.map(RunId::from_uuid).unwrap_or_else(RunId::new);
            let outcome = tokio::task::spawn_blocking(move || {
                if resume.is_some() {
                    controller.resume(bundle, run_id)
                } else {
                    controller.run(bundle, loop_config, run_id)
                }
            })
            .await
            .expect("loop worker task panicked");

            match outcome {
                Ok(outcome) => {
                    if matches!(outcome.stop_reason, residency_loop::StopReason::Cancelled) {
                        if !quiet {
                            output::render_loop_outcome(&outcome, json_output);
                        }
                        ExitCode::from(130)
                    } else if !quiet {
                        output::render_loop_outcome(&outcome, json_output);
                        if outcome.success {
                            ExitCode::SUCCESS
                        } else {
                            ExitCode::FAILURE
                        }
                    } else if outcome.success {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "generate run failed");
                    ExitCode::FAILURE
                }
            }
        }

        Command::ResilienceHarness {
            start,
            end,
            algorithm,
            timeout,
            seed,
            threshold,
            json_output,
        } => {
            let bundle = demo::demo_bundle(start, end, algorithm.into(), timeout, seed, 1);
            let loop_config = LoopConfig::default();
            let threshold = threshold.unwrap_or(app_config.harness_threshold);

            let cancel = CancelToken::new();
            spawn_ctrl_c_watcher(cancel.clone());

            let report = tokio::task::spawn_blocking(move || {
                if cancel.is_cancelled() {
                    None
                } else {
                    Some(run_resilience_harness(&bundle, &loop_config, threshold))
                }
            })
            .await
            .expect("harness worker task panicked");

            match report {
                Some(report) => {
                    output::render_harness_report(&report, json_output);
                    if report.passed {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                None => ExitCode::from(130),
            }
        }
    }
}

/// Cancels `token` on the first Ctrl-C (spec: exit code 130 on
/// interruption). A second Ctrl-C is left to the default handler so a
/// genuinely stuck run can still be killed.
fn spawn_ctrl_c_watcher(token: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received Ctrl-C, cancelling run");
            token.cancel();
        }
    });
}
