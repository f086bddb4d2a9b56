//! Persisted rating files
//!
//! One competitor per line as `rank,competitor_name,rating`. Exports carry the
//! normalized ranking; imports feed an initial vector to the estimators.
//! Names may contain commas: the rank ends at the first comma and the rating
//! starts after the last one.

use crate::error::{RankingError, Result};
use crate::rating::weng_lin::BayesianRating;
use crate::types::{CompetitorId, RankedRating, RatingVector};
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write one `rank,name,rating` line per entry
pub fn write_ratings<W: Write>(mut writer: W, ranking: &[RankedRating]) -> Result<()> {
    for entry in ranking {
        writeln!(writer, "{},{},{:?}", entry.rank, entry.competitor, entry.rating)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse `rank,name,rating` lines; blank lines are skipped
pub fn read_ratings<R: BufRead>(reader: R) -> Result<RatingVector> {
    let mut ratings = RatingVector::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let invalid = |reason: &str| RankingError::InvalidRatingRecord {
            line: line_number,
            reason: reason.to_string(),
        };

        let (rank, rest) = line
            .split_once(',')
            .ok_or_else(|| invalid("expected rank,name,rating"))?;
        let (name, rating) = rest
            .rsplit_once(',')
            .ok_or_else(|| invalid("expected rank,name,rating"))?;

        rank.trim()
            .parse::<usize>()
            .map_err(|_| invalid(&format!("rank {:?} is not an integer", rank.trim())))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("empty competitor name").into());
        }

        let rating: f64 = rating
            .trim()
            .parse()
            .map_err(|_| invalid(&format!("rating {:?} is not a number", rating.trim())))?;
        if !(rating.is_finite() && rating >= 0.0) {
            return Err(invalid(&format!("rating {} is negative or not finite", rating)).into());
        }

        ratings.insert(CompetitorId::named(name), rating);
    }

    Ok(ratings)
}

/// Write one `rank,name,conservative,mu,sigma` line per Bayesian rating
pub fn write_bayesian_ratings<W: Write>(
    mut writer: W,
    ranking: &[(CompetitorId, BayesianRating)],
) -> Result<()> {
    for (rank, (competitor, rating)) in ranking.iter().enumerate() {
        writeln!(
            writer,
            "{},{},{:.6},{:?},{:?}",
            rank + 1,
            competitor,
            rating.conservative(),
            rating.mu,
            rating.sigma
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_bayesian_ratings(path: &Path, ranking: &[(CompetitorId, BayesianRating)]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create ratings file {}", path.display()))?;
    write_bayesian_ratings(BufWriter::new(file), ranking)?;
    info!("Wrote {} ratings to {}", ranking.len(), path.display());
    Ok(())
}

pub fn save_ratings(path: &Path, ranking: &[RankedRating]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create ratings file {}", path.display()))?;
    write_ratings(BufWriter::new(file), ranking)?;
    info!("Wrote {} ratings to {}", ranking.len(), path.display());
    Ok(())
}

pub fn load_ratings(path: &Path) -> Result<RatingVector> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open ratings file {}", path.display()))?;
    let ratings = read_ratings(BufReader::new(file))?;
    info!("Read {} previous ratings from {}", ratings.len(), path.display());
    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(rank: usize, name: &str, rating: f64) -> RankedRating {
        RankedRating {
            rank,
            competitor: CompetitorId::named(name),
            rating,
        }
    }

    #[test]
    fn test_write_format() {
        let mut buffer = Vec::new();
        write_ratings(&mut buffer, &[entry(1, "alice (12)", 0.625), entry(2, "bob (7)", 0.375)]).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "1,alice (12),0.625\n2,bob (7),0.375\n"
        );
    }

    #[test]
    fn test_read_with_whitespace_and_comma_in_name() {
        let text = "1, alice (12) ,0.5\n\n2,smith, john (3),2.5e-1\n";
        let ratings = read_ratings(Cursor::new(text)).unwrap();

        assert_eq!(ratings[&CompetitorId::named("alice (12)")], 0.5);
        assert_eq!(ratings[&CompetitorId::named("smith, john (3)")], 0.25);
    }

    #[test]
    fn test_written_file_reads_back() {
        let ranking = vec![entry(1, "a", 0.1 + 0.2), entry(2, "b", 1e-20)];
        let mut buffer = Vec::new();
        write_ratings(&mut buffer, &ranking).unwrap();

        let ratings = read_ratings(Cursor::new(buffer)).unwrap();
        assert_eq!(ratings[&CompetitorId::named("a")], 0.1 + 0.2);
        assert_eq!(ratings[&CompetitorId::named("b")], 1e-20);
    }

    #[test]
    fn test_read_rejects_bad_lines() {
        for text in ["1,alice", "x,alice,0.5", "1,,0.5", "1,alice,abc", "1,alice,-0.5", "1,alice,inf"] {
            let err = read_ratings(Cursor::new(text)).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<RankingError>(),
                    Some(RankingError::InvalidRatingRecord { line: 1, .. })
                ),
                "accepted {:?}",
                text
            );
        }
    }

    #[test]
    fn test_collapsed_rating_reads_back_as_zero() {
        let ranking = vec![entry(1, "A", 0.75), entry(2, "B", 0.25), entry(3, "C", 0.0)];
        let mut buffer = Vec::new();
        write_ratings(&mut buffer, &ranking).unwrap();
        assert!(String::from_utf8(buffer.clone()).unwrap().ends_with("3,C,0.0\n"));

        let ratings = read_ratings(Cursor::new(buffer)).unwrap();
        assert_eq!(ratings[&CompetitorId::named("C")], 0.0);
    }

    #[test]
    fn test_bayesian_format() {
        let rating = BayesianRating { mu: 30.0, sigma: 2.5 };
        let mut buffer = Vec::new();
        write_bayesian_ratings(&mut buffer, &[(CompetitorId::named("a (1)"), rating)]).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "1,a (1),22.500000,30.0,2.5\n");
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("pl-ranking-ratings-{}.csv", std::process::id()));
        save_ratings(&path, &[entry(1, "a", 0.75), entry(2, "b", 0.25)]).unwrap();
        let ratings = load_ratings(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[&CompetitorId::named("b")], 0.25);
    }
}
