//! Pre-flight connectivity check
//!
//! A single heuristic pass recording which competitors have evidence of
//! having beaten someone and of having been beaten. Competitors missing either
//! kind almost certainly make the MM recurrence diverge. The scan follows each
//! game's recorded order and is not transitive, so a clean report does not
//! prove the comparison graph is strongly connected.

use crate::error::{RankingError, Result};
use crate::types::{CompetitorId, RankingCorpus};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Competitors lacking one kind of comparison evidence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    /// Recorded losses but no win
    pub never_won: BTreeSet<CompetitorId>,
    /// Recorded wins but no loss
    pub never_lost: BTreeSet<CompetitorId>,
}

impl ConnectivityReport {
    /// No competitor was flagged
    pub fn is_clean(&self) -> bool {
        self.never_won.is_empty() && self.never_lost.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Evidence {
    recorded: bool,
    won: bool,
    lost: bool,
}

impl Evidence {
    fn mark_win(&mut self) {
        self.recorded = true;
        self.won = true;
    }

    fn mark_loss(&mut self) {
        self.recorded = true;
        self.lost = true;
    }
}

/// Scan every game and report competitors without win or loss evidence
pub fn diagnose(corpus: &RankingCorpus) -> Result<ConnectivityReport> {
    let mut evidence: BTreeMap<&CompetitorId, Evidence> = corpus
        .games()
        .iter()
        .flat_map(|game| game.competitors())
        .map(|competitor| (competitor, Evidence::default()))
        .collect();

    for game in corpus.games() {
        let best = game.best_finish();
        let mut worst: Option<(&CompetitorId, f64)> = None;

        for (competitor, finish) in game.entries() {
            if *finish > best {
                mark(&mut evidence, competitor, Evidence::mark_loss);
            }

            match worst {
                Some((previous, worst_finish)) if *finish > worst_finish => {
                    mark(&mut evidence, previous, Evidence::mark_win);
                    worst = Some((competitor, *finish));
                }
                Some((_, worst_finish)) if *finish < worst_finish => {
                    mark(&mut evidence, competitor, Evidence::mark_win);
                }
                Some(_) => {}
                None => worst = Some((competitor, *finish)),
            }
        }
    }

    let mut report = ConnectivityReport::default();
    for (competitor, record) in evidence {
        if !record.recorded {
            debug!("{} has no recorded comparison evidence", competitor);
            continue;
        }
        match (record.won, record.lost) {
            (true, true) => {}
            (true, false) => {
                warn!("Player {} has no loss", competitor);
                report.never_lost.insert(competitor.clone());
            }
            (false, true) => {
                warn!("Player {} has no win", competitor);
                report.never_won.insert(competitor.clone());
            }
            (false, false) => {
                return Err(RankingError::ConnectivityInconsistency {
                    competitor: competitor.to_string(),
                }
                .into());
            }
        }
    }

    Ok(report)
}

fn mark(
    evidence: &mut BTreeMap<&CompetitorId, Evidence>,
    competitor: &CompetitorId,
    update: fn(&mut Evidence),
) {
    // Every competitor got a record before the scan started.
    if let Some(record) = evidence.get_mut(competitor) {
        update(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Game;

    fn corpus(games: Vec<Game>) -> RankingCorpus {
        games.into_iter().collect()
    }

    fn ids(names: &[&str]) -> BTreeSet<CompetitorId> {
        names.iter().map(|n| CompetitorId::named(*n)).collect()
    }

    #[test]
    fn test_single_game_flags_both_sides() {
        let report = diagnose(&corpus(vec![Game::from_ranks([("A", 1), ("B", 2)]).unwrap()])).unwrap();

        assert_eq!(report.never_lost, ids(&["A"]));
        assert_eq!(report.never_won, ids(&["B"]));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_round_robin_is_clean() {
        let report = diagnose(&corpus(vec![
            Game::from_ranks([("A", 1), ("B", 2), ("C", 3)]).unwrap(),
            Game::from_ranks([("B", 1), ("C", 2), ("A", 3)]).unwrap(),
            Game::from_ranks([("C", 1), ("A", 2), ("B", 3)]).unwrap(),
        ]))
        .unwrap();

        assert!(report.is_clean());
    }

    #[test]
    fn test_reverse_recorded_order() {
        // Worst finisher recorded first: the winner earns evidence directly.
        let report = diagnose(&corpus(vec![
            Game::from_ranks([("B", 2), ("A", 1)]).unwrap(),
            Game::from_ranks([("B", 1), ("A", 2)]).unwrap(),
        ]))
        .unwrap();

        assert!(report.is_clean());
    }

    #[test]
    fn test_best_finish_is_relative_to_the_game() {
        // No one holds rank 1; B is still the best finisher of this game.
        let report = diagnose(&corpus(vec![Game::from_ranks([("B", 2), ("C", 3)]).unwrap()])).unwrap();

        assert_eq!(report.never_lost, ids(&["B"]));
        assert_eq!(report.never_won, ids(&["C"]));
    }

    #[test]
    fn test_tied_leader_without_evidence_is_not_reported() {
        let report =
            diagnose(&corpus(vec![Game::from_ranks([("A", 1), ("B", 1), ("C", 2)]).unwrap()])).unwrap();

        assert_eq!(report.never_lost, ids(&["A"]));
        assert_eq!(report.never_won, ids(&["C"]));
        assert!(!report.never_lost.contains(&CompetitorId::named("B")));
    }

    #[test]
    fn test_diagnose_does_not_mutate_corpus() {
        let original = corpus(vec![Game::from_ranks([("A", 1), ("B", 2)]).unwrap()]);
        let copy = original.clone();
        diagnose(&original).unwrap();
        assert_eq!(original, copy);
    }
}
