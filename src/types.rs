//! Common types used throughout the rating engine

use crate::error::{RankingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identity of a competitor in a ranked game
///
/// Real competitors are named; the anchor is a synthetic marker that can never
/// collide with a real name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompetitorId {
    Named(String),
    Anchor,
}

impl CompetitorId {
    pub fn named(name: impl Into<String>) -> Self {
        CompetitorId::Named(name.into())
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, CompetitorId::Anchor)
    }
}

impl std::fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitorId::Named(name) => f.pad(name),
            CompetitorId::Anchor => f.pad("<anchor>"),
        }
    }
}

impl From<&str> for CompetitorId {
    fn from(name: &str) -> Self {
        CompetitorId::Named(name.to_string())
    }
}

impl From<String> for CompetitorId {
    fn from(name: String) -> Self {
        CompetitorId::Named(name)
    }
}

/// Strength parameters keyed by competitor
pub type RatingVector = BTreeMap<CompetitorId, f64>;

/// One game: each competitor's finish value, lower is better, equal values tie
///
/// Entries keep the order they were recorded in. The connectivity scan depends
/// on that order; the estimators do not.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    entries: Vec<(CompetitorId, f64)>,
}

impl Game {
    /// Build a game, rejecting duplicates, non-finite finishes and games with
    /// fewer than two competitors
    pub fn new<I, C>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<CompetitorId>,
    {
        let entries: Vec<(CompetitorId, f64)> = entries
            .into_iter()
            .map(|(competitor, finish)| (competitor.into(), finish))
            .collect();

        if entries.len() < 2 {
            return Err(RankingError::MalformedGame {
                reason: format!("{} competitor(s), at least 2 required", entries.len()),
            }
            .into());
        }

        let mut seen = BTreeSet::new();
        for (competitor, finish) in &entries {
            if !finish.is_finite() {
                return Err(RankingError::MalformedGame {
                    reason: format!("{} has non-finite finish {}", competitor, finish),
                }
                .into());
            }
            if !seen.insert(competitor) {
                return Err(RankingError::MalformedGame {
                    reason: format!("{} appears more than once", competitor),
                }
                .into());
            }
        }

        Ok(Self { entries })
    }

    /// Build a game from integer placings (1 = first)
    pub fn from_ranks<I, C>(ranks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, u32)>,
        C: Into<CompetitorId>,
    {
        Self::new(ranks.into_iter().map(|(c, rank)| (c, f64::from(rank))))
    }

    pub fn entries(&self) -> &[(CompetitorId, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn competitors(&self) -> impl Iterator<Item = &CompetitorId> {
        self.entries.iter().map(|(c, _)| c)
    }

    pub fn finish(&self, competitor: &CompetitorId) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == competitor)
            .map(|(_, finish)| *finish)
    }

    pub fn best_finish(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, f)| *f)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn worst_finish(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, f)| *f)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Distinct finish values in ascending order with the worst one removed
    ///
    /// Each value is the boundary of one elimination round: everyone finishing
    /// at or behind it is still in the pool when that round is decided.
    pub fn elimination_rounds(&self) -> Vec<f64> {
        let mut places: Vec<f64> = self.entries.iter().map(|(_, f)| *f).collect();
        places.sort_by(f64::total_cmp);
        places.dedup();
        places.pop();
        places
    }

    /// Competitors ordered best to worst; tied competitors keep recorded order
    pub fn ordered_best_to_worst(&self) -> Vec<&CompetitorId> {
        let mut ordered: Vec<&(CompetitorId, f64)> = self.entries.iter().collect();
        ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
        ordered.into_iter().map(|(c, _)| c).collect()
    }
}

/// Ordered collection of games fed to the estimators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingCorpus {
    games: Vec<Game>,
}

impl RankingCorpus {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn push(&mut self, game: Game) {
        self.games.push(game);
    }

    /// Every distinct competitor in the corpus
    pub fn competitors(&self) -> BTreeSet<CompetitorId> {
        self.games
            .iter()
            .flat_map(|g| g.competitors().cloned())
            .collect()
    }
}

impl FromIterator<Game> for RankingCorpus {
    fn from_iter<T: IntoIterator<Item = Game>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<Game> for RankingCorpus {
    fn extend<T: IntoIterator<Item = Game>>(&mut self, iter: T) {
        self.games.extend(iter);
    }
}

/// A rating placed in a sorted ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRating {
    /// 1-based position, best first
    pub rank: usize,
    pub competitor: CompetitorId,
    pub rating: f64,
}
