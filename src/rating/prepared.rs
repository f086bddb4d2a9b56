//! Corpus preprocessing shared by the estimation backends
//!
//! Maps competitors to dense indices, derives each game's elimination round
//! boundaries and the fixed win credits, and rejects inputs whose MM
//! denominator would be zero.

use crate::error::{RankingError, Result};
use crate::types::{CompetitorId, RankingCorpus, RatingVector};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One game with competitors replaced by dense indices
#[derive(Debug, Clone)]
pub struct PreparedGame {
    /// (competitor index, finish) in recorded order
    pub entries: Vec<(usize, f64)>,
    /// Distinct finishes ascending, worst removed
    pub rounds: Vec<f64>,
}

impl PreparedGame {
    /// Entries ordered best to worst, ties in recorded order
    pub fn ordered_best_to_worst(&self) -> Vec<(usize, f64)> {
        let mut ordered = self.entries.clone();
        ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
        ordered
    }
}

/// Indexed form of a corpus
#[derive(Debug, Clone)]
pub struct PreparedCorpus {
    competitors: Vec<CompetitorId>,
    index: HashMap<CompetitorId, usize>,
    games: Vec<PreparedGame>,
    win_credits: Vec<f64>,
}

impl PreparedCorpus {
    pub fn new(corpus: &RankingCorpus) -> Result<Self> {
        if corpus.is_empty() {
            return Err(RankingError::SingularComparisonGraph {
                reason: "corpus contains no games".to_string(),
            }
            .into());
        }

        let competitors: Vec<CompetitorId> = corpus.competitors().into_iter().collect();
        let index: HashMap<CompetitorId, usize> = competitors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let mut win_credits = vec![0.0; competitors.len()];
        let mut ranked = vec![false; competitors.len()];
        let mut games = Vec::with_capacity(corpus.len());

        for game in corpus.games() {
            let worst = game.worst_finish();
            let rounds = game.elimination_rounds();
            let entries: Vec<(usize, f64)> = game
                .entries()
                .iter()
                .map(|(competitor, finish)| (index[competitor], *finish))
                .collect();

            for &(i, finish) in &entries {
                if finish < worst {
                    win_credits[i] += 1.0;
                }
                // Everyone is in the pool of the first round.
                if !rounds.is_empty() {
                    ranked[i] = true;
                }
            }

            games.push(PreparedGame { entries, rounds });
        }

        if let Some(unranked) = ranked.iter().position(|r| !r) {
            return Err(RankingError::UnrankedCompetitor {
                competitor: competitors[unranked].to_string(),
            }
            .into());
        }

        Ok(Self {
            competitors,
            index,
            games,
            win_credits,
        })
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn competitors(&self) -> &[CompetitorId] {
        &self.competitors
    }

    pub fn index_of(&self, competitor: &CompetitorId) -> Option<usize> {
        self.index.get(competitor).copied()
    }

    pub fn games(&self) -> &[PreparedGame] {
        &self.games
    }

    /// Games each competitor finished outside the last-place group
    pub fn win_credits(&self) -> &[f64] {
        &self.win_credits
    }

    pub fn win_credits_by_competitor(&self) -> RatingVector {
        self.to_ratings(&self.win_credits)
    }

    /// Starting gammas: the supplied vector where it has a positive entry,
    /// `1/n` for missing or zero entries
    ///
    /// A collapsed competitor is exported with rating zero; restarting it at
    /// zero would pin it there.
    pub fn initial_gammas(&self, initial: Option<&RatingVector>) -> Result<Vec<f64>> {
        let uniform = 1.0 / self.len() as f64;
        let Some(initial) = initial else {
            return Ok(vec![uniform; self.len()]);
        };

        self.competitors
            .iter()
            .map(|competitor| match initial.get(competitor) {
                None => Ok(uniform),
                Some(&value) if value == 0.0 => {
                    debug!("{} restarts from {} instead of zero", competitor, uniform);
                    Ok(uniform)
                }
                Some(&value) if value.is_finite() && value > 0.0 => Ok(value),
                Some(&value) => Err(RankingError::InvalidInitialRating {
                    competitor: competitor.to_string(),
                    value,
                }
                .into()),
            })
            .collect()
    }

    pub fn to_ratings(&self, gammas: &[f64]) -> RatingVector {
        self.competitors
            .iter()
            .cloned()
            .zip(gammas.iter().copied())
            .collect()
    }

    /// Warn about competitors whose gamma the MM update will drive to zero
    pub fn warn_zero_credit(&self) {
        for (competitor, credit) in self.competitors.iter().zip(&self.win_credits) {
            if *credit == 0.0 {
                warn!("{} never finished ahead of anyone; its rating will collapse to zero", competitor);
            }
        }
    }

    /// `gamma' = w / d`, failing on a zero denominator
    pub fn update_gammas(&self, denominators: &[f64]) -> Result<Vec<f64>> {
        self.win_credits
            .iter()
            .zip(denominators)
            .enumerate()
            .map(|(i, (credit, denominator))| {
                if *denominator > 0.0 && denominator.is_finite() {
                    Ok(credit / denominator)
                } else {
                    Err(RankingError::UnrankedCompetitor {
                        competitor: self.competitors[i].to_string(),
                    }
                    .into())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Game;

    fn corpus(games: Vec<Game>) -> RankingCorpus {
        games.into_iter().collect()
    }

    #[test]
    fn test_win_credits_with_tie_at_top() {
        let prepared =
            PreparedCorpus::new(&corpus(vec![Game::from_ranks([("A", 1), ("B", 1), ("C", 2)]).unwrap()]))
                .unwrap();

        let credits = prepared.win_credits_by_competitor();
        assert_eq!(credits[&CompetitorId::named("A")], 1.0);
        assert_eq!(credits[&CompetitorId::named("B")], 1.0);
        assert_eq!(credits[&CompetitorId::named("C")], 0.0);
        assert_eq!(prepared.games()[0].rounds, vec![1.0]);
    }

    #[test]
    fn test_win_credits_with_tie_at_bottom() {
        let prepared = PreparedCorpus::new(&corpus(vec![
            Game::from_ranks([("A", 1), ("B", 2), ("C", 2)]).unwrap(),
            Game::from_ranks([("B", 1), ("A", 2)]).unwrap(),
        ]))
        .unwrap();

        assert_eq!(prepared.win_credits().iter().sum::<f64>(), 2.0);
        assert_eq!(prepared.win_credits_by_competitor()[&CompetitorId::named("B")], 1.0);
    }

    #[test]
    fn test_uniform_initialization() {
        let prepared =
            PreparedCorpus::new(&corpus(vec![Game::from_ranks([("A", 1), ("B", 2), ("C", 3), ("D", 4)]).unwrap()]))
                .unwrap();
        assert_eq!(prepared.initial_gammas(None).unwrap(), vec![0.25; 4]);
    }

    #[test]
    fn test_partial_initial_vector() {
        let prepared =
            PreparedCorpus::new(&corpus(vec![Game::from_ranks([("A", 1), ("B", 2)]).unwrap()])).unwrap();

        let mut initial = RatingVector::new();
        initial.insert(CompetitorId::named("A"), 0.8);
        initial.insert(CompetitorId::named("Z"), 0.1);

        assert_eq!(prepared.initial_gammas(Some(&initial)).unwrap(), vec![0.8, 0.5]);

        initial.insert(CompetitorId::named("B"), 0.0);
        assert_eq!(prepared.initial_gammas(Some(&initial)).unwrap(), vec![0.8, 0.5]);

        initial.insert(CompetitorId::named("B"), -0.25);
        let err = prepared.initial_gammas(Some(&initial)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RankingError>(),
            Some(RankingError::InvalidInitialRating { .. })
        ));
    }

    #[test]
    fn test_competitor_only_in_all_tied_games_is_rejected() {
        let err = PreparedCorpus::new(&corpus(vec![
            Game::from_ranks([("A", 1), ("B", 2)]).unwrap(),
            Game::from_ranks([("C", 1), ("D", 1)]).unwrap(),
        ]))
        .unwrap_err();

        match err.downcast_ref::<RankingError>() {
            Some(RankingError::UnrankedCompetitor { competitor }) => assert_eq!(competitor, "C"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        assert!(PreparedCorpus::new(&RankingCorpus::default()).is_err());
    }

    #[test]
    fn test_update_rejects_zero_denominator() {
        let prepared =
            PreparedCorpus::new(&corpus(vec![Game::from_ranks([("A", 1), ("B", 2)]).unwrap()])).unwrap();
        assert_eq!(prepared.update_gammas(&[2.0, 1.0]).unwrap(), vec![0.5, 0.0]);
        assert!(prepared.update_gammas(&[0.0, 1.0]).is_err());
    }
}
