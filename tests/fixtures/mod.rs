//! Corpus builders and observers shared by the integration tests

#![allow(dead_code)]

use pl_ranking::rating::{IterationObserver, IterationReport};
use pl_ranking::{CompetitorId, Game, RankingCorpus, RatingVector};

/// Three competitors who each win one game of a full rotation
pub fn cycle_corpus() -> RankingCorpus {
    vec![
        Game::from_ranks([("A", 1), ("B", 2), ("C", 3)]).unwrap(),
        Game::from_ranks([("B", 1), ("C", 2), ("A", 3)]).unwrap(),
        Game::from_ranks([("C", 1), ("A", 2), ("B", 3)]).unwrap(),
    ]
    .into_iter()
    .collect()
}

pub fn player_name(index: usize) -> String {
    format!("p{:02}", index)
}

/// Deterministic corpus over a prime number of competitors
///
/// Competitor `p00` is the strongest. With `upsets` enabled nearby
/// competitors sometimes swap places; without it every game finishes in
/// strength order.
pub fn generated_corpus(players: usize, games: usize, seats: usize, upsets: bool) -> RankingCorpus {
    assert!(seats <= players && players > 1);

    (0..games)
        .map(|g| {
            let start = (g * 7) % players;
            let step = 1 + g % (players - 1);
            let mut table: Vec<(usize, usize)> = (0..seats)
                .map(|j| {
                    let player = (start + j * step) % players;
                    let noise = if upsets { (g * 31 + player * 17) % 5 } else { 0 };
                    (player, player + noise)
                })
                .collect();
            table.sort_by_key(|&(player, key)| (key, player));

            Game::new(
                table
                    .iter()
                    .enumerate()
                    .map(|(place, (player, _))| (player_name(*player), (place + 1) as f64)),
            )
            .unwrap()
        })
        .collect()
}

/// Rescale to unit sum
pub fn normalized(ratings: &RatingVector) -> RatingVector {
    let total: f64 = ratings.values().sum();
    ratings.iter().map(|(c, v)| (c.clone(), v / total)).collect()
}

pub fn max_abs_difference(a: &RatingVector, b: &RatingVector) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .map(|(competitor, value)| (value - b[competitor]).abs())
        .fold(0.0, f64::max)
}

pub fn id(name: &str) -> CompetitorId {
    CompetitorId::named(name)
}

/// Observer that keeps every report it receives
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub deltas: Vec<f64>,
    pub divergences: Vec<u64>,
}

impl IterationObserver for RecordingObserver {
    fn on_iteration(&mut self, report: &IterationReport) {
        self.deltas.push(report.l2_delta);
    }

    fn on_divergence(&mut self, report: &IterationReport) {
        self.divergences.push(report.iteration);
    }
}
