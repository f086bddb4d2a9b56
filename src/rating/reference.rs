//! Scalar MM solver
//!
//! Hunter's minorization-maximization recurrence for the Plackett-Luce model
//! with ties, evaluated round by round exactly as written:
//!
//! ```text
//! gamma'[c] = w[c] / sum over games, rounds p with finish(c) >= p of 1 / S(p)
//! S(p)      = sum of gamma[x] over competitors x with finish(x) >= p
//! ```
//!
//! Gammas are never renormalized, so their sum drifts freely between
//! iterations.

use crate::error::{RankingError, Result};
use crate::rating::estimator::{Estimate, EstimateOptions, RatingEstimator};
use crate::rating::prepared::PreparedCorpus;
use crate::rating::progress::{l2_distance, ConvergenceMonitor, IterationObserver, MonitorStep};
use crate::types::{RankingCorpus, RatingVector};

#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEstimator;

impl RatingEstimator for ReferenceEstimator {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn estimate(
        &self,
        corpus: &RankingCorpus,
        options: &EstimateOptions,
        initial: Option<&RatingVector>,
        observer: &mut dyn IterationObserver,
    ) -> Result<Estimate> {
        let prepared = PreparedCorpus::new(corpus)?;
        prepared.warn_zero_credit();

        let mut gammas = prepared.initial_gammas(initial)?;
        let mut monitor = ConvergenceMonitor::new(self.name(), options);

        loop {
            let denominators = denominators(&prepared, &gammas)?;
            let next = prepared.update_gammas(&denominators)?;
            let delta = l2_distance(&next, &gammas);
            gammas = next;

            match monitor.record(delta, observer) {
                MonitorStep::Continue => {}
                step => return Ok(monitor.finish(prepared.to_ratings(&gammas), step)),
            }
        }
    }
}

/// `d[c]` for every competitor under the current gammas
pub fn denominators(prepared: &PreparedCorpus, gammas: &[f64]) -> Result<Vec<f64>> {
    let mut denominators = vec![0.0; prepared.len()];

    for (game_index, game) in prepared.games().iter().enumerate() {
        for &place in &game.rounds {
            let pool: f64 = game
                .entries
                .iter()
                .filter(|(_, finish)| *finish >= place)
                .map(|(i, _)| gammas[*i])
                .sum();

            if !(pool > 0.0 && pool.is_finite()) {
                return Err(RankingError::DegeneratePool {
                    game: game_index,
                    place,
                }
                .into());
            }

            let share = 1.0 / pool;
            for &(i, finish) in &game.entries {
                if finish >= place {
                    denominators[i] += share;
                }
            }
        }
    }

    Ok(denominators)
}
