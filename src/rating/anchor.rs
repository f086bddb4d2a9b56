//! Anchor competitor augmentation
//!
//! Adds a synthetic competitor that beats and loses to every real competitor
//! exactly once, which makes the comparison graph strongly connected. The
//! anchor pulls every rating slightly toward its own strength; on large
//! corpora the effect is negligible.

use crate::error::Result;
use crate::types::{CompetitorId, Game, RankingCorpus, RatingVector};
use std::collections::BTreeSet;

/// Copy of `corpus` with two anchor games appended per real competitor
pub fn augment(corpus: &RankingCorpus, competitors: &BTreeSet<CompetitorId>) -> Result<RankingCorpus> {
    let mut augmented = corpus.clone();

    for competitor in competitors.iter().filter(|c| !c.is_anchor()) {
        augmented.push(Game::new([
            (CompetitorId::Anchor, 1.0),
            (competitor.clone(), 2.0),
        ])?);
        augmented.push(Game::new([
            (CompetitorId::Anchor, 2.0),
            (competitor.clone(), 1.0),
        ])?);
    }

    Ok(augmented)
}

/// Drop the anchor's entry from an estimated vector
pub fn strip_anchor(mut ratings: RatingVector) -> RatingVector {
    ratings.remove(&CompetitorId::Anchor);
    ratings
}
