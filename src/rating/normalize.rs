//! Rating normalization and ranking tables

use crate::error::{RankingError, Result};
use crate::types::{CompetitorId, RankedRating, RatingVector};

/// Rescale ratings so they sum to one, keeping order and ratios
pub fn normalize_ratings(ratings: &[(CompetitorId, f64)]) -> Result<Vec<(CompetitorId, f64)>> {
    let total: f64 = ratings.iter().map(|(_, value)| value).sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(RankingError::DegenerateRatings {
            reason: format!("ratings sum to {}", total),
        }
        .into());
    }

    Ok(ratings
        .iter()
        .map(|(competitor, value)| (competitor.clone(), value / total))
        .collect())
}

/// Sort ratings best first, normalize them and number the positions
pub fn rank_ratings(ratings: &RatingVector) -> Result<Vec<RankedRating>> {
    let mut sorted: Vec<(CompetitorId, f64)> = ratings
        .iter()
        .map(|(competitor, value)| (competitor.clone(), *value))
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(normalize_ratings(&sorted)?
        .into_iter()
        .enumerate()
        .map(|(i, (competitor, rating))| RankedRating {
            rank: i + 1,
            competitor,
            rating,
        })
        .collect())
}

/// The first `limit` entries of a ranking, renormalized among themselves.
/// A limit of zero, or one past the end, keeps the whole ranking.
pub fn top_ratings(ranking: &[RankedRating], limit: usize) -> Result<Vec<RankedRating>> {
    let shown = if limit > 0 && limit < ranking.len() {
        &ranking[..limit]
    } else {
        ranking
    };

    let pairs: Vec<(CompetitorId, f64)> = shown
        .iter()
        .map(|entry| (entry.competitor.clone(), entry.rating))
        .collect();

    Ok(normalize_ratings(&pairs)?
        .into_iter()
        .zip(shown)
        .map(|((competitor, rating), entry)| RankedRating {
            rank: entry.rank,
            competitor,
            rating,
        })
        .collect())
}
