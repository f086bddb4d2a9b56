//! Weng-Lin (OpenSkill) Bayesian rater
//!
//! An alternative to the Plackett-Luce estimators: games are replayed in
//! corpus order and every competitor's Gaussian belief is updated with the
//! multi-team Weng-Lin rule from the skillratings crate. Ratings are ranked by
//! the conservative estimate `mu - 3 * sigma`.

use crate::error::{RankingError, Result};
use crate::types::{CompetitorId, Game, RankingCorpus};
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::{weng_lin_multi_team, WengLinConfig, WengLinRating};
use skillratings::MultiTeamOutcome;
use std::collections::BTreeMap;
use tracing::info;

/// Games between progress log lines
const PROGRESS_INTERVAL: usize = 10_000;

/// Extended configuration for the Weng-Lin rating system
/// This wraps the skillratings WengLinConfig with the starting belief
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedWengLinConfig {
    /// Core Weng-Lin parameters
    pub weng_lin_config: WengLinConfig,
    /// Initial mean for new competitors
    pub initial_rating: f64,
    /// Initial standard deviation for new competitors
    pub initial_uncertainty: f64,
}

impl Default for ExtendedWengLinConfig {
    fn default() -> Self {
        let initial = WengLinRating::new();
        Self {
            weng_lin_config: WengLinConfig::new(),
            initial_rating: initial.rating,
            initial_uncertainty: initial.uncertainty,
        }
    }
}

impl ExtendedWengLinConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.weng_lin_config.beta <= 0.0 {
            return Err(RankingError::ConfigurationError {
                message: "Beta must be positive".to_string(),
            }
            .into());
        }

        if self.weng_lin_config.uncertainty_tolerance < 0.0 {
            return Err(RankingError::ConfigurationError {
                message: "Uncertainty tolerance must be non-negative".to_string(),
            }
            .into());
        }

        if self.initial_uncertainty <= 0.0 {
            return Err(RankingError::ConfigurationError {
                message: "Initial uncertainty must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Gaussian skill belief
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesianRating {
    pub mu: f64,
    pub sigma: f64,
}

impl BayesianRating {
    /// Lower bound used for ordering
    pub fn conservative(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

impl From<WengLinRating> for BayesianRating {
    fn from(rating: WengLinRating) -> Self {
        Self {
            mu: rating.rating,
            sigma: rating.uncertainty,
        }
    }
}

impl From<BayesianRating> for WengLinRating {
    fn from(rating: BayesianRating) -> Self {
        Self {
            rating: rating.mu,
            uncertainty: rating.sigma,
        }
    }
}

pub type BayesianRatings = BTreeMap<CompetitorId, BayesianRating>;

/// Sequential Weng-Lin rater
#[derive(Debug)]
pub struct WengLinRater {
    config: ExtendedWengLinConfig,
}

impl WengLinRater {
    pub fn new(config: ExtendedWengLinConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn initial_rating(&self) -> BayesianRating {
        BayesianRating {
            mu: self.config.initial_rating,
            sigma: self.config.initial_uncertainty,
        }
    }

    /// Apply one game's result to `ratings`, adding unseen competitors
    pub fn rate_game(&self, game: &Game, ratings: &mut BayesianRatings) {
        let mut places: Vec<f64> = game.entries().iter().map(|(_, f)| *f).collect();
        places.sort_by(f64::total_cmp);
        places.dedup();

        // Tied finishes share a dense place so the update treats them as draws.
        let teams: Vec<([WengLinRating; 1], MultiTeamOutcome)> = game
            .entries()
            .iter()
            .map(|(competitor, finish)| {
                let current = *ratings
                    .entry(competitor.clone())
                    .or_insert_with(|| self.initial_rating());
                let place = places.partition_point(|p| p < finish) + 1;
                ([current.into()], MultiTeamOutcome::new(place))
            })
            .collect();

        let teams_refs: Vec<(&[WengLinRating], MultiTeamOutcome)> = teams
            .iter()
            .map(|(team, outcome)| (team.as_slice(), *outcome))
            .collect();

        let updated = weng_lin_multi_team(&teams_refs, &self.config.weng_lin_config);

        for ((competitor, _), team) in game.entries().iter().zip(updated) {
            if let Some(rating) = team.first() {
                ratings.insert(competitor.clone(), (*rating).into());
            }
        }
    }

    /// Replay the corpus in order, starting from `previous` where present
    pub fn rate_corpus(
        &self,
        corpus: &RankingCorpus,
        previous: Option<&BayesianRatings>,
    ) -> BayesianRatings {
        let mut ratings = previous.cloned().unwrap_or_default();

        for (count, game) in corpus.games().iter().enumerate() {
            self.rate_game(game, &mut ratings);
            if (count + 1) % PROGRESS_INTERVAL == 0 {
                info!("Rated {} games", count + 1);
            }
        }

        info!("Rated {} games", corpus.len());
        ratings
    }
}

/// Sort by conservative estimate, best first
pub fn conservative_ranking(ratings: &BayesianRatings) -> Vec<(CompetitorId, BayesianRating)> {
    let mut ranking: Vec<(CompetitorId, BayesianRating)> = ratings
        .iter()
        .map(|(competitor, rating)| (competitor.clone(), *rating))
        .collect();
    ranking.sort_by(|a, b| {
        b.1.conservative()
            .total_cmp(&a.1.conservative())
            .then_with(|| a.0.cmp(&b.0))
    });
    ranking
}
