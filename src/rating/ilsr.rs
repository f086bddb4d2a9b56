//! Iterative Luce spectral ranking
//!
//! Each iteration turns every game into a continuous-time Markov chain over
//! competitors: at each stage of a best-to-worst ordering, every competitor
//! still in the pool sends rate `1 / (pool strength)` to the stage winner. The
//! chain's stationary distribution is the next strength vector. The fixed
//! point is the Plackett-Luce maximum-likelihood estimate, the same one the
//! MM solvers reach.
//!
//! Tied competitors are ordered as recorded, so games with ties are treated
//! as strict rankings here.

use crate::error::{RankingError, Result};
use crate::rating::estimator::{Estimate, EstimateOptions, RatingEstimator};
use crate::rating::prepared::PreparedCorpus;
use crate::rating::progress::{l2_distance, ConvergenceMonitor, IterationObserver, MonitorStep};
use crate::types::{RankingCorpus, RatingVector};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Default, Clone, Copy)]
pub struct IlsrEstimator;

impl RatingEstimator for IlsrEstimator {
    fn name(&self) -> &'static str {
        "ilsr"
    }

    fn estimate(
        &self,
        corpus: &RankingCorpus,
        options: &EstimateOptions,
        initial: Option<&RatingVector>,
        observer: &mut dyn IterationObserver,
    ) -> Result<Estimate> {
        let prepared = PreparedCorpus::new(corpus)?;
        let orderings: Vec<Vec<(usize, f64)>> = prepared
            .games()
            .iter()
            .map(|game| game.ordered_best_to_worst())
            .collect();

        let mut strengths = prepared.initial_gammas(initial)?;
        let total: f64 = strengths.iter().sum();
        strengths.iter_mut().for_each(|s| *s /= total);

        let mut monitor = ConvergenceMonitor::new(self.name(), options);

        loop {
            let rates = transition_rates(prepared.len(), &orderings, &strengths)?;
            let next = stationary_distribution(&rates)?;
            let delta = l2_distance(&next, &strengths);
            strengths = next;

            match monitor.record(delta, observer) {
                MonitorStep::Continue => {}
                step => return Ok(monitor.finish(prepared.to_ratings(&strengths), step)),
            }
        }
    }
}

/// `rates[(loser, winner)]` accumulated over every stage of every game.
/// Orderings hold `(competitor index, finish)` best to worst.
fn transition_rates(
    competitors: usize,
    orderings: &[Vec<(usize, f64)>],
    strengths: &[f64],
) -> Result<DMatrix<f64>> {
    let mut rates = DMatrix::<f64>::zeros(competitors, competitors);

    for (game, ordering) in orderings.iter().enumerate() {
        let mut remaining: f64 = ordering.iter().map(|&(i, _)| strengths[i]).sum();

        for (stage, &(winner, finish)) in ordering[..ordering.len() - 1].iter().enumerate() {
            if !(remaining > 0.0 && remaining.is_finite()) {
                return Err(RankingError::DegeneratePool {
                    game,
                    place: finish,
                }
                .into());
            }

            let rate = 1.0 / remaining;
            for &(loser, _) in &ordering[stage + 1..] {
                rates[(loser, winner)] += rate;
            }
            remaining -= strengths[winner];
        }
    }

    Ok(rates)
}

/// Stationary distribution of the chain with the given off-diagonal rates,
/// scaled to sum to one
fn stationary_distribution(rates: &DMatrix<f64>) -> Result<Vec<f64>> {
    let n = rates.nrows();

    // Balance equations pi^T Q = 0, with the last one replaced by sum(pi) = 1.
    let mut system = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let outflow: f64 = rates.row(i).sum();
        for j in 0..n {
            if i != j {
                system[(j, i)] = rates[(i, j)];
            }
        }
        system[(i, i)] = -outflow;
    }
    for j in 0..n {
        system[(n - 1, j)] = 1.0;
    }

    let mut rhs = DVector::<f64>::zeros(n);
    rhs[n - 1] = 1.0;

    let solution = system
        .lu()
        .solve(&rhs)
        .ok_or_else(|| RankingError::SingularComparisonGraph {
            reason: "transition chain has no unique stationary distribution".to_string(),
        })?;

    if solution.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
        return Err(RankingError::SingularComparisonGraph {
            reason: "some competitors are unreachable in the comparison graph".to_string(),
        }
        .into());
    }

    let total = solution.sum();
    Ok(solution.iter().map(|p| p / total).collect())
}
