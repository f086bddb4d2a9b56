//! Predictive quality of a rating vector against recorded games
//!
//! Every pair of competitors with different finishes in a game is one
//! prediction. A pair is misordered when the better finisher does not hold the
//! strictly higher rating, so equal ratings always count as wrong. The win
//! probability error compares `a / (a + b)` with the recorded outcome.

use crate::error::{RankingError, Result};
use crate::types::{RankingCorpus, RatingVector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Plackett-Luce probability that `a` finishes ahead of `b`
pub fn pl_win_probability(a: f64, b: f64) -> f64 {
    let total = a + b;
    if total > 0.0 {
        a / total
    } else {
        0.5
    }
}

/// Counts gathered by [`evaluate`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Decided pairs with both competitors rated
    pub predictions: usize,
    /// Decided pairs skipped because a competitor had no rating
    pub missed: usize,
    pub misordered: usize,
    pub squared_error: f64,
}

impl EvaluationReport {
    /// Share of predictions that put the pair in the wrong order
    pub fn order_error(&self) -> f64 {
        self.misordered as f64 / self.predictions as f64
    }

    /// Root mean squared error of the pairwise win probabilities
    pub fn rmse(&self) -> f64 {
        (self.squared_error / self.predictions as f64).sqrt()
    }
}

/// Score `ratings` against every decided pair in `corpus`
pub fn evaluate(corpus: &RankingCorpus, ratings: &RatingVector) -> Result<EvaluationReport> {
    let mut report = EvaluationReport::default();

    for game in corpus.games() {
        let entries = game.entries();
        for (i, (first, first_finish)) in entries.iter().enumerate() {
            for (second, second_finish) in &entries[i + 1..] {
                if first_finish == second_finish {
                    continue;
                }
                let (winner, loser) = if first_finish < second_finish {
                    (first, second)
                } else {
                    (second, first)
                };

                let (Some(&w), Some(&l)) = (ratings.get(winner), ratings.get(loser)) else {
                    report.missed += 1;
                    continue;
                };

                report.predictions += 1;
                if w <= l {
                    report.misordered += 1;
                }
                let miss = 1.0 - pl_win_probability(w, l);
                report.squared_error += miss * miss;
            }
        }
    }

    if report.missed > 0 {
        warn!(
            "Could not make a prediction for {} pairs, with {} predictions made.",
            report.missed, report.predictions
        );
    }
    if report.predictions == 0 {
        return Err(RankingError::DegenerateRatings {
            reason: "no decided pair has both competitors rated".to_string(),
        }
        .into());
    }

    info!(
        "Evaluated {} pairs: {} misordered",
        report.predictions, report.misordered
    );
    Ok(report)
}
