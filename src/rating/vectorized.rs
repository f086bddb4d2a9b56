//! Flat-array MM solver
//!
//! Same recurrence as the reference solver, but each game is pre-sorted into
//! finish groups laid out in contiguous buffers. One iteration is a handful of
//! linear passes: group sums, a reverse cumulative sum giving every round's
//! pool, a forward cumulative sum of reciprocal pools, and a scatter of those
//! sums back onto competitors. Gammas are renormalized to sum to one after
//! every iteration.

use crate::error::{RankingError, Result};
use crate::rating::estimator::{Estimate, EstimateOptions, RatingEstimator};
use crate::rating::prepared::PreparedCorpus;
use crate::rating::progress::{l2_distance, ConvergenceMonitor, IterationObserver, MonitorStep};
use crate::types::{RankingCorpus, RatingVector};
use std::ops::Range;

#[derive(Debug, Default, Clone, Copy)]
pub struct VectorizedEstimator;

impl RatingEstimator for VectorizedEstimator {
    fn name(&self) -> &'static str {
        "vectorized"
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

        let layout = GroupLayout::new(&prepared);
        let mut gammas = normalized(prepared.initial_gammas(initial)?)?;
        let mut monitor = ConvergenceMonitor::new(self.name(), options);
        let mut scratch = Scratch::new(&layout, prepared.len());

        loop {
            layout.denominators(&gammas, &mut scratch)?;
            let next = normalized(prepared.update_gammas(&scratch.denominators)?)?;
            let delta = l2_distance(&next, &gammas);
            gammas = next;

            match monitor.record(delta, observer) {
                MonitorStep::Continue => {}
                step => return Ok(monitor.finish(prepared.to_ratings(&gammas), step)),
            }
        }
    }
}

/// Every game's competitors grouped by finish, concatenated game after game
#[derive(Debug, Clone)]
struct GroupLayout {
    /// Competitor index per slot
    slot_competitor: Vec<usize>,
    /// Global group index per slot
    slot_group: Vec<usize>,
    /// Finish value per group
    group_place: Vec<f64>,
    /// Group range per game; the last group of a game is its last-place tie
    game_groups: Vec<Range<usize>>,
}

impl GroupLayout {
    fn new(prepared: &PreparedCorpus) -> Self {
        let mut layout = Self {
            slot_competitor: Vec::new(),
            slot_group: Vec::new(),
            group_place: Vec::new(),
            game_groups: Vec::with_capacity(prepared.games().len()),
        };

        for game in prepared.games() {
            let mut sorted = game.entries.clone();
            sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

            let start = layout.group_place.len();
            for (competitor, finish) in sorted {
                if layout.group_place.len() == start
                    || layout.group_place[layout.group_place.len() - 1] != finish
                {
                    layout.group_place.push(finish);
                }
                layout.slot_competitor.push(competitor);
                layout.slot_group.push(layout.group_place.len() - 1);
            }
            layout.game_groups.push(start..layout.group_place.len());
        }

        layout
    }

    fn denominators(&self, gammas: &[f64], scratch: &mut Scratch) -> Result<()> {
        // Gamma mass per finish group.
        scratch.group_values.iter_mut().for_each(|v| *v = 0.0);
        for (&competitor, &group) in self.slot_competitor.iter().zip(&self.slot_group) {
            scratch.group_values[group] += gammas[competitor];
        }

        for (game, groups) in self.game_groups.iter().enumerate() {
            let values = &mut scratch.group_values[groups.clone()];

            // Reverse cumulative sum: pool of the round opened by each group.
            for j in (0..values.len().saturating_sub(1)).rev() {
                values[j] += values[j + 1];
            }

            // Forward cumulative sum of 1 / pool over the round boundaries;
            // the last-place group shares the total of every round.
            let mut running = 0.0;
            let rounds = values.len() - 1;
            for j in 0..values.len() {
                if j < rounds {
                    let pool = values[j];
                    if !(pool > 0.0 && pool.is_finite()) {
                        return Err(RankingError::DegeneratePool {
                            game,
                            place: self.group_place[groups.start + j],
                        }
                        .into());
                    }
                    running += 1.0 / pool;
                }
                values[j] = running;
            }
        }

        scratch.denominators.iter_mut().for_each(|d| *d = 0.0);
        for (&competitor, &group) in self.slot_competitor.iter().zip(&self.slot_group) {
            scratch.denominators[competitor] += scratch.group_values[group];
        }

        Ok(())
    }
}

/// Buffers reused across iterations
#[derive(Debug)]
struct Scratch {
    group_values: Vec<f64>,
    denominators: Vec<f64>,
}

impl Scratch {
    fn new(layout: &GroupLayout, competitors: usize) -> Self {
        Self {
            group_values: vec![0.0; layout.group_place.len()],
            denominators: vec![0.0; competitors],
        }
    }
}

fn normalized(mut gammas: Vec<f64>) -> Result<Vec<f64>> {
    let total: f64 = gammas.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(RankingError::DegenerateRatings {
            reason: format!("gamma sum is {}", total),
        }
        .into());
    }
    gammas.iter_mut().for_each(|g| *g /= total);
    Ok(gammas)
}
