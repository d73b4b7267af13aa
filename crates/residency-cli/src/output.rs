//! Human-readable and JSON rendering for loop and harness results.

use residency_loop::harness::{HarnessReport, ScenarioResult};
use residency_loop::{LoopOutcome, StopReason};
use serde::Serialize;

#[derive(Serialize)]
struct LoopOutcomeJson {
    run_id: String,
    success: bool,
    stop_reason: String,
    final_score: f64,
    final_iteration: u32,
    total_time_secs: f64,
}

impl From<&LoopOutcome> for LoopOutcomeJson {
    fn from(o: &LoopOutcome) -> Self {
        Self {
            run_id: o.run_id.to_string(),
            success: o.success,
            stop_reason: stop_reason_str(o.stop_reason).to_string(),
            final_score: o.final_score,
            final_iteration: o.final_iteration,
            total_time_secs: o.total_time.as_secs_f64(),
        }
    }
}

fn stop_reason_str(reason: StopReason) -> &'static str {
    match reason {
        StopReason::TargetReached => "target-reached",
        StopReason::Exhausted => "exhausted",
        StopReason::Stagnation => "stagnation",
        StopReason::TimedOut => "timed-out",
        StopReason::Cancelled => "cancelled",
    }
}

pub fn render_loop_outcome(outcome: &LoopOutcome, json: bool) {
    if json {
        let payload = LoopOutcomeJson::from(outcome);
        println!("{}", serde_json::to_string_pretty(&payload).expect("serializable"));
        return;
    }

    println!("run {}", outcome.run_id);
    println!("  stop reason:     {}", stop_reason_str(outcome.stop_reason));
    println!("  success:         {}", outcome.success);
    println!("  final score:     {:.4}", outcome.final_score);
    println!("  final iteration: {}", outcome.final_iteration);
    println!("  total time:      {:.2}s", outcome.total_time.as_secs_f64());
}

#[derive(Serialize)]
struct ScenarioResultJson {
    scenario: String,
    feasible: bool,
    score: f64,
    degradation: f64,
}

impl From<&ScenarioResult> for ScenarioResultJson {
    fn from(r: &ScenarioResult) -> Self {
        Self {
            scenario: r.scenario.tag().to_string(),
            feasible: r.feasible,
            score: r.score,
            degradation: r.degradation,
        }
    }
}

#[derive(Serialize)]
struct HarnessReportJson {
    threshold: f64,
    passed: bool,
    feasible_count: usize,
    total: usize,
    average_degradation: f64,
    results: Vec<ScenarioResultJson>,
}

impl From<&HarnessReport> for HarnessReportJson {
    fn from(r: &HarnessReport) -> Self {
        Self {
            threshold: r.threshold,
            passed: r.passed,
            feasible_count: r.feasible_count,
            total: r.total,
            average_degradation: r.average_degradation,
            results: r.results.iter().map(ScenarioResultJson::from).collect(),
        }
    }
}

pub fn render_harness_report(report: &HarnessReport, json: bool) {
    if json {
        let payload = HarnessReportJson::from(report);
        println!("{}", serde_json::to_string_pretty(&payload).expect("serializable"));
        return;
    }

    println!(
        "resilience harness: {}/{} scenarios feasible (threshold {:.0}%), verdict {}",
        report.feasible_count,
        report.total,
        report.threshold * 100.0,
        if report.passed { "PASS" } else { "FAIL" }
    );
    println!("  average degradation: {:.4}", report.average_degradation);
    for r in &report.results {
        println!(
            "  {:<24} feasible={:<5} score={:.4} degradation={:.4}",
            r.scenario.tag(),
            r.feasible,
            r.score,
            r.degradation
        );
    }
}
