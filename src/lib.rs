//! PL Ranking - Plackett-Luce strength estimation for multi-competitor games
//!
//! This crate turns recorded game results into competitor strengths using
//! minorization-maximization or iterative Luce spectral ranking, with
//! connectivity diagnostics, anchor augmentation and persisted rating files.

pub mod config;
pub mod corpus;
pub mod error;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use rating::{estimate, EstimateOptions, EstimationBackend, IterationObserver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
