//! Iteration progress reporting and convergence tracking
//!
//! Every backend funnels its per-iteration L2 delta through a
//! [`ConvergenceMonitor`], which decides whether to keep going and hands an
//! [`IterationReport`] to the caller's [`IterationObserver`].

use crate::rating::estimator::{ConvergenceStatus, Estimate, EstimateOptions};
use crate::types::RatingVector;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Upper bounds on how long an estimation may run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationBudget {
    pub max_iterations: Option<u64>,
    pub max_duration: Option<Duration>,
}

impl IterationBudget {
    /// Run until converged
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn iterations(max_iterations: u64) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            max_duration: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_iterations.is_none() && self.max_duration.is_none()
    }

    fn exhausted(&self, iterations: u64, elapsed: Duration) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max)
            || self.max_duration.is_some_and(|max| elapsed >= max)
    }
}

/// Progress of a single iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    pub backend: &'static str,
    /// 1-based iteration index
    pub iteration: u64,
    /// Time spent in this iteration
    pub iteration_time: Duration,
    /// Time since the estimation started
    pub elapsed: Duration,
    /// L2 distance between this iteration's vector and the previous one
    pub l2_delta: f64,
    pub previous_delta: Option<f64>,
}

impl IterationReport {
    /// True when the delta grew compared to the previous iteration
    pub fn is_diverging(&self) -> bool {
        self.previous_delta
            .is_some_and(|previous| self.l2_delta > previous)
    }
}

/// Hook receiving per-iteration progress
#[cfg_attr(test, mockall::automock)]
pub trait IterationObserver {
    fn on_iteration(&mut self, report: &IterationReport);

    /// Called after `on_iteration` when the delta increased; advisory only
    fn on_divergence(&mut self, report: &IterationReport) {
        let _ = report;
    }
}

/// Observer that logs every iteration through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl IterationObserver for TracingObserver {
    fn on_iteration(&mut self, report: &IterationReport) {
        info!(
            "{} {:.2} seconds L2={:.2e}",
            report.iteration,
            report.iteration_time.as_secs_f64(),
            report.l2_delta
        );
    }

    fn on_divergence(&mut self, report: &IterationReport) {
        warn!(
            "Gamma difference increased, {:.4e} {:.4e}",
            report.l2_delta,
            report.previous_delta.unwrap_or(f64::NAN)
        );
    }
}

/// Observer that ignores progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl IterationObserver for NoOpObserver {
    fn on_iteration(&mut self, _report: &IterationReport) {}
}

/// Outcome of recording one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStep {
    Continue,
    Converged,
    BudgetExhausted,
}

/// Tracks deltas, timing and budget across the iterations of one run
#[derive(Debug)]
pub struct ConvergenceMonitor {
    backend: &'static str,
    tolerance: f64,
    budget: IterationBudget,
    started: Instant,
    last_tick: Instant,
    iteration: u64,
    previous_delta: Option<f64>,
}

impl ConvergenceMonitor {
    pub fn new(backend: &'static str, options: &EstimateOptions) -> Self {
        let now = Instant::now();
        Self {
            backend,
            tolerance: options.tolerance,
            budget: options.budget,
            started: now,
            last_tick: now,
            iteration: 0,
            previous_delta: None,
        }
    }

    /// Record the delta of a finished iteration and decide what happens next
    pub fn record(&mut self, l2_delta: f64, observer: &mut dyn IterationObserver) -> MonitorStep {
        self.iteration += 1;
        let now = Instant::now();

        let report = IterationReport {
            backend: self.backend,
            iteration: self.iteration,
            iteration_time: now - self.last_tick,
            elapsed: now - self.started,
            l2_delta,
            previous_delta: self.previous_delta,
        };
        observer.on_iteration(&report);
        if report.is_diverging() {
            observer.on_divergence(&report);
        }

        self.previous_delta = Some(l2_delta);
        self.last_tick = now;

        if l2_delta <= self.tolerance {
            MonitorStep::Converged
        } else if self.budget.exhausted(self.iteration, report.elapsed) {
            MonitorStep::BudgetExhausted
        } else {
            MonitorStep::Continue
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    /// Package the final vector; `step` must be a terminal step
    pub fn finish(&self, ratings: RatingVector, step: MonitorStep) -> Estimate {
        let status = match step {
            MonitorStep::BudgetExhausted => ConvergenceStatus::BudgetExhausted,
            MonitorStep::Converged | MonitorStep::Continue => ConvergenceStatus::Converged,
        };

        Estimate {
            ratings,
            iterations: self.iteration,
            final_delta: self.previous_delta.unwrap_or(0.0),
            status,
        }
    }
}

/// Euclidean distance between two gamma vectors of equal length
pub fn l2_distance(current: &[f64], previous: &[f64]) -> f64 {
    current
        .iter()
        .zip(previous)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::function;

    fn options(tolerance: f64, budget: IterationBudget) -> EstimateOptions {
        EstimateOptions { tolerance, budget }
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance(&[3.0, 0.0], &[0.0, 4.0]), 5.0);
        assert_eq!(l2_distance(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_converges_at_tolerance() {
        let mut monitor = ConvergenceMonitor::new("test", &options(0.1, IterationBudget::unbounded()));
        let mut observer = NoOpObserver;

        assert_eq!(monitor.record(1.0, &mut observer), MonitorStep::Continue);
        assert_eq!(monitor.record(0.5, &mut observer), MonitorStep::Continue);
        assert_eq!(monitor.record(0.1, &mut observer), MonitorStep::Converged);
        assert_eq!(monitor.iterations(), 3);
    }

    #[test]
    fn test_iteration_budget() {
        let mut monitor = ConvergenceMonitor::new("test", &options(1e-12, IterationBudget::iterations(2)));
        let mut observer = NoOpObserver;

        assert_eq!(monitor.record(1.0, &mut observer), MonitorStep::Continue);
        let step = monitor.record(0.9, &mut observer);
        assert_eq!(step, MonitorStep::BudgetExhausted);

        let estimate = monitor.finish(RatingVector::new(), step);
        assert_eq!(estimate.status, ConvergenceStatus::BudgetExhausted);
        assert_eq!(estimate.iterations, 2);
        assert_eq!(estimate.final_delta, 0.9);
    }

    #[test]
    fn test_convergence_wins_over_exhausted_budget() {
        let mut monitor = ConvergenceMonitor::new("test", &options(0.5, IterationBudget::iterations(1)));
        assert_eq!(monitor.record(0.25, &mut NoOpObserver), MonitorStep::Converged);
    }

    #[test]
    fn test_duration_budget() {
        let budget = IterationBudget {
            max_iterations: None,
            max_duration: Some(Duration::ZERO),
        };
        let mut monitor = ConvergenceMonitor::new("test", &options(1e-12, budget));
        assert_eq!(monitor.record(1.0, &mut NoOpObserver), MonitorStep::BudgetExhausted);
    }

    #[test]
    fn test_observer_sees_every_iteration_and_divergence() {
        let mut observer = MockIterationObserver::new();
        observer.expect_on_iteration().times(3).return_const(());
        observer
            .expect_on_divergence()
            .with(function(|report: &IterationReport| {
                report.iteration == 2 && report.previous_delta == Some(0.5)
            }))
            .times(1)
            .return_const(());

        let mut monitor = ConvergenceMonitor::new("test", &options(0.01, IterationBudget::unbounded()));
        assert_eq!(monitor.record(0.5, &mut observer), MonitorStep::Continue);
        assert_eq!(monitor.record(0.8, &mut observer), MonitorStep::Continue);
        assert_eq!(monitor.record(0.005, &mut observer), MonitorStep::Converged);
    }

    #[test]
    fn test_report_divergence_flag() {
        let report = IterationReport {
            backend: "test",
            iteration: 2,
            iteration_time: Duration::ZERO,
            elapsed: Duration::ZERO,
            l2_delta: 0.3,
            previous_delta: Some(0.2),
        };
        assert!(report.is_diverging());

        let first = IterationReport {
            previous_delta: None,
            ..report
        };
        assert!(!first.is_diverging());
    }
}
