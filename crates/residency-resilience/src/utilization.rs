//! Utilization Monitor (spec §4.5.1, "queueing core").
//!
//! Models the scheduling system as an M/M/c queue and matches the
//! original Python `UtilizationMonitor`
//! (`app/resilience/engine/utilization_monitor.py`) formula-for-formula:
//! `A = λ/μ`, Erlang-C, `L_q = Erlang_C · ρ/(1−ρ)`, `W_q = L_q/λ`
//! (Little's Law). Threshold ladder 0.80/0.90/0.95/0.98 unchanged.

use chrono::{DateTime, Utc};
use residency_core::UtilizationLevel;
use std::collections::VecDeque;

fn factorial(n: u32) -> f64 {
    (1..=n).fold(1.0_f64, |acc, k| acc * k as f64)
}

/// Erlang-C probability that an arriving request must wait (all `c`
/// servers busy), for traffic intensity `A = λ/μ` and `c` servers.
pub fn erlang_c(c: u32, lambda: f64, mu: f64) -> f64 {
    debug_assert!(c > 0 && mu > 0.0);
    let a = lambda / mu;
    let rho = lambda / (c as f64 * mu);
    if rho >= 1.0 {
        return 1.0;
    }
    let numerator = a.powf(c as f64) / factorial(c) * (c as f64 / (c as f64 - a));
    let sum: f64 = (0..c).map(|k| a.powi(k as i32) / factorial(k)).sum();
    numerator / (sum + numerator)
}

/// `L_q = Erlang_C · ρ/(1−ρ)`; saturates toward infinity as ρ→1.
pub fn expected_queue_length(c: u32, lambda: f64, mu: f64) -> f64 {
    let rho = lambda / (c as f64 * mu);
    if rho >= 1.0 {
        return f64::INFINITY;
    }
    erlang_c(c, lambda, mu) * rho / (1.0 - rho)
}

/// `W_q = L_q/λ` (Little's Law).
pub fn expected_wait(c: u32, lambda: f64, mu: f64) -> f64 {
    if lambda <= 0.0 {
        return 0.0;
    }
    expected_queue_length(c, lambda, mu) / lambda
}

pub fn utilization_level(rho: f64) -> UtilizationLevel {
    if rho >= 0.98 {
        UtilizationLevel::Black
    } else if rho >= 0.95 {
        UtilizationLevel::Red
    } else if rho >= 0.90 {
        UtilizationLevel::Orange
    } else if rho >= 0.80 {
        UtilizationLevel::Yellow
    } else {
        UtilizationLevel::Green
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UtilizationSnapshot {
    pub recorded_at: DateTime<Utc>,
    pub servers: u32,
    pub arrival_rate: f64,
    pub service_rate: f64,
    pub rho: f64,
    pub level: UtilizationLevel,
    pub queue_length: f64,
    pub wait_hours: f64,
}

impl UtilizationSnapshot {
    pub fn compute(servers: u32, arrival_rate: f64, service_rate: f64, recorded_at: DateTime<Utc>) -> Self {
        let rho = arrival_rate / (servers as f64 * service_rate);
        Self {
            recorded_at,
            servers,
            arrival_rate,
            service_rate,
            rho,
            level: utilization_level(rho),
            queue_length: expected_queue_length(servers, arrival_rate, service_rate),
            wait_hours: expected_wait(servers, arrival_rate, service_rate),
        }
    }
}

const TREND_WINDOW_DAYS: usize = 28;

/// Rolling 28-day ρ history, used to compute a linear trend slope for
/// alerting (spec §4.5.1, "Snapshots and trends... persisted for
/// alerting").
#[derive(Debug, Default)]
pub struct UtilizationMonitor {
    history: VecDeque<UtilizationSnapshot>,
}

impl UtilizationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: UtilizationSnapshot) {
        if self.history.len() == TREND_WINDOW_DAYS {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    pub fn latest(&self) -> Option<&UtilizationSnapshot> {
        self.history.back()
    }

    /// Linear least-squares slope of ρ over the window's index (day 0..N),
    /// `None` with fewer than two points.
    pub fn trend(&self) -> Option<f64> {
        let n = self.history.len();
        if n < 2 {
            return None;
        }
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ys: Vec<f64> = self.history.iter().map(|s| s.rho).collect();
        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;
        let numerator: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
        let denominator: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if denominator == 0.0 {
            Some(0.0)
        } else {
            Some(numerator / denominator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S6: c=5, λ=4.8/hour, μ=1.0/hour → ρ=0.96 → RED, L_q > 0.
    #[test]
    fn s6_scenario_crosses_into_red_with_positive_queue_length() {
        let snapshot = UtilizationSnapshot::compute(5, 4.8, 1.0, Utc::now());
        assert!((snapshot.rho - 0.96).abs() < 1e-9);
        assert_eq!(snapshot.level, UtilizationLevel::Red);
        assert!(snapshot.queue_length > 0.0);
    }

    /// P11: for fixed c, μ, L_q is monotonically non-decreasing in λ, and
    /// the named thresholds fire the expected level transitions.
    #[test]
    fn erlang_queue_length_is_monotonic_in_arrival_rate_and_crosses_named_thresholds() {
        let c = 5;
        let mu = 1.0;
        let mut previous = 0.0;
        let mut saw = [false; 4]; // yellow, orange, red, black
        for tenth in 1..=99 {
            let lambda = c as f64 * mu * (tenth as f64 / 100.0);
            let lq = expected_queue_length(c, lambda, mu);
            assert!(lq >= previous - 1e-9, "L_q decreased at lambda={lambda}");
            previous = lq;

            let rho = lambda / (c as f64 * mu);
            let level = utilization_level(rho);
            match level {
                UtilizationLevel::Yellow => saw[0] = true,
                UtilizationLevel::Orange => saw[1] = true,
                UtilizationLevel::Red => saw[2] = true,
                UtilizationLevel::Black => saw[3] = true,
                UtilizationLevel::Green => {}
            }
        }
        assert!(saw.iter().all(|&s| s), "expected to observe all four elevated levels");
    }

    #[test]
    fn trend_is_none_with_fewer_than_two_points() {
        let mut monitor = UtilizationMonitor::new();
        assert!(monitor.trend().is_none());
        monitor.record(UtilizationSnapshot::compute(5, 2.0, 1.0, Utc::now()));
        assert!(monitor.trend().is_none());
    }

    #[test]
    fn trend_is_positive_when_rho_is_rising() {
        let mut monitor = UtilizationMonitor::new();
        for lambda in [1.0, 2.0, 3.0, 4.0] {
            monitor.record(UtilizationSnapshot::compute(5, lambda, 1.0, Utc::now()));
        }
        assert!(monitor.trend().unwrap() > 0.0);
    }
}
