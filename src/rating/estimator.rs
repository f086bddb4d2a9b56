//! Estimation interface shared by all Plackett-Luce backends
//!
//! The caller picks a backend explicitly with [`EstimationBackend`]; every
//! backend consumes the same corpus, tolerance, budget and optional initial
//! vector, and reports progress through the same observer hook.

use crate::error::{RankingError, Result};
use crate::rating::ilsr::IlsrEstimator;
use crate::rating::progress::{IterationBudget, IterationObserver};
use crate::rating::reference::ReferenceEstimator;
use crate::rating::vectorized::VectorizedEstimator;
use crate::types::{RankingCorpus, RatingVector};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

/// Available solvers for the same estimation problem
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EstimationBackend {
    /// Scalar MM recurrence, never renormalized
    Reference,
    /// Flat-array MM recurrence, renormalized every iteration
    #[default]
    Vectorized,
    /// Iterative Luce spectral ranking
    Ilsr,
}

impl EstimationBackend {
    pub fn estimator(self) -> Box<dyn RatingEstimator> {
        match self {
            EstimationBackend::Reference => Box::new(ReferenceEstimator),
            EstimationBackend::Vectorized => Box::new(VectorizedEstimator),
            EstimationBackend::Ilsr => Box::new(IlsrEstimator),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EstimationBackend::Reference => "plain min-max algorithm",
            EstimationBackend::Vectorized => "vectorized min-max algorithm",
            EstimationBackend::Ilsr => "iLSR algorithm",
        }
    }
}

impl std::fmt::Display for EstimationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationBackend::Reference => write!(f, "reference"),
            EstimationBackend::Vectorized => write!(f, "vectorized"),
            EstimationBackend::Ilsr => write!(f, "ilsr"),
        }
    }
}

impl FromStr for EstimationBackend {
    type Err = RankingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reference" => Ok(EstimationBackend::Reference),
            "vectorized" => Ok(EstimationBackend::Vectorized),
            "ilsr" => Ok(EstimationBackend::Ilsr),
            other => Err(RankingError::ConfigurationError {
                message: format!("Unknown estimation backend: {}", other),
            }),
        }
    }
}

/// Stopping rules for one estimation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateOptions {
    /// Converged once the L2 delta is at most this
    pub tolerance: f64,
    pub budget: IterationBudget,
}

impl EstimateOptions {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            budget: IterationBudget::unbounded(),
        }
    }

    pub fn with_budget(mut self, budget: IterationBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RankingError::ConfigurationError {
                message: format!("Tolerance must be positive, got {}", self.tolerance),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self::new(crate::config::rating::DEFAULT_TOLERANCE)
    }
}

/// Whether a run reached its tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    Converged,
    BudgetExhausted,
}

/// Result of an estimation run
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Unnormalized strength per competitor
    pub ratings: RatingVector,
    pub iterations: u64,
    /// L2 delta of the last iteration
    pub final_delta: f64,
    pub status: ConvergenceStatus,
}

impl Estimate {
    pub fn is_converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }

    /// Ratings of a converged run, or `DidNotConverge`
    pub fn into_converged(self) -> Result<RatingVector> {
        match self.status {
            ConvergenceStatus::Converged => Ok(self.ratings),
            ConvergenceStatus::BudgetExhausted => Err(RankingError::DidNotConverge {
                iterations: self.iterations,
                last_delta: self.final_delta,
            }
            .into()),
        }
    }
}

/// A solver producing Plackett-Luce strengths from a corpus
pub trait RatingEstimator {
    fn name(&self) -> &'static str;

    /// Iterate from `initial` (uniform when absent) until the tolerance or the
    /// budget is reached
    fn estimate(
        &self,
        corpus: &RankingCorpus,
        options: &EstimateOptions,
        initial: Option<&RatingVector>,
        observer: &mut dyn IterationObserver,
    ) -> Result<Estimate>;
}

/// Run `backend` on `corpus`
pub fn estimate(
    corpus: &RankingCorpus,
    options: &EstimateOptions,
    backend: EstimationBackend,
    initial: Option<&RatingVector>,
    observer: &mut dyn IterationObserver,
) -> Result<Estimate> {
    options.validate()?;

    info!("Using {}.", backend.description());
    let estimate = backend
        .estimator()
        .estimate(corpus, options, initial, observer)?;

    match estimate.status {
        ConvergenceStatus::Converged => info!(
            "Converged after {} iterations (L2={:.2e})",
            estimate.iterations, estimate.final_delta
        ),
        ConvergenceStatus::BudgetExhausted => info!(
            "Stopped after {} iterations without converging (L2={:.2e})",
            estimate.iterations, estimate.final_delta
        ),
    }

    Ok(estimate)
}
