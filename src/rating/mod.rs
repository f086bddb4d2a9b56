//! Plackett-Luce strength estimation
//!
//! This module provides the minorization-maximization estimators (reference
//! and vectorized), the iterative Luce spectral ranking backend, connectivity
//! diagnostics, anchor augmentation, normalization, persisted rating files and
//! pairwise evaluation of a rating vector against recorded games.
//! A Weng-Lin (OpenSkill) rater from the skillratings crate is available as a
//! sequential alternative.

pub mod anchor;
pub mod diagnostic;
pub mod estimator;
pub mod evaluate;
pub mod ilsr;
pub mod normalize;
pub mod prepared;
pub mod progress;
pub mod reference;
pub mod storage;
pub mod vectorized;
pub mod weng_lin;

// Re-export commonly used types
pub use anchor::{augment, strip_anchor};
pub use diagnostic::{diagnose, ConnectivityReport};
pub use estimator::{
    estimate, ConvergenceStatus, Estimate, EstimateOptions, EstimationBackend, RatingEstimator,
};
pub use evaluate::{evaluate, pl_win_probability, EvaluationReport};
pub use normalize::{normalize_ratings, rank_ratings, top_ratings};
pub use progress::{
    IterationBudget, IterationObserver, IterationReport, NoOpObserver, TracingObserver,
};
pub use storage::{
    load_ratings, read_ratings, save_bayesian_ratings, save_ratings, write_bayesian_ratings,
    write_ratings,
};
pub use weng_lin::{
    conservative_ranking, BayesianRating, BayesianRatings, ExtendedWengLinConfig, WengLinRater,
};
