//! Error types for the rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate. Domain failures are `RankingError` variants that callers
//! can recover with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific estimation scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Malformed game: {reason}")]
    MalformedGame { reason: String },

    #[error("Competitor {competitor} is never ranked against anyone")]
    UnrankedCompetitor { competitor: String },

    #[error("Active pool collapsed to zero in game {game} at place {place}")]
    DegeneratePool { game: usize, place: f64 },

    #[error("Invalid initial rating for {competitor}: {value}")]
    InvalidInitialRating { competitor: String, value: f64 },

    #[error("Competitor {competitor} has neither win nor loss evidence recorded")]
    ConnectivityInconsistency { competitor: String },

    #[error("Ratings did not converge within {iterations} iterations (last L2 delta {last_delta:.4e})")]
    DidNotConverge { iterations: u64, last_delta: f64 },

    #[error("Comparison graph is not solvable: {reason}")]
    SingularComparisonGraph { reason: String },

    #[error("Cannot normalize ratings: {reason}")]
    DegenerateRatings { reason: String },

    #[error("Invalid rating record on line {line}: {reason}")]
    InvalidRatingRecord { line: usize, reason: String },

    #[error("Invalid game record: {reason}")]
    InvalidGameRecord { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
