//! Estimation configuration

use crate::error::{RankingError, Result};
use crate::rating::estimator::{EstimateOptions, EstimationBackend};
use crate::rating::progress::IterationBudget;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default L2 convergence tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Settings that control one estimation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Stop once the L2 distance between successive vectors is at most this
    pub tolerance: f64,
    /// Give up after this many iterations (unbounded when absent)
    pub max_iterations: Option<u64>,
    /// Give up after this much wall-clock time (unbounded when absent)
    pub max_duration_seconds: Option<u64>,
    /// Which solver runs the estimation
    pub backend: EstimationBackend,
    /// Add a synthetic competitor with a win and a loss against everyone
    pub anchor_competitor: bool,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: None,
            max_duration_seconds: None,
            backend: EstimationBackend::Vectorized,
            anchor_competitor: false,
        }
    }
}

impl RatingConfig {
    pub fn budget(&self) -> IterationBudget {
        IterationBudget {
            max_iterations: self.max_iterations,
            max_duration: self.max_duration_seconds.map(Duration::from_secs),
        }
    }

    pub fn estimate_options(&self) -> EstimateOptions {
        EstimateOptions {
            tolerance: self.tolerance,
            budget: self.budget(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RankingError::ConfigurationError {
                message: format!("Tolerance must be positive, got {}", self.tolerance),
            }
            .into());
        }

        if self.max_iterations == Some(0) {
            return Err(RankingError::ConfigurationError {
                message: "Max iterations must be greater than 0".to_string(),
            }
            .into());
        }

        if self.max_duration_seconds == Some(0) {
            return Err(RankingError::ConfigurationError {
                message: "Max duration must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_and_unbounded() {
        let config = RatingConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.budget().is_unbounded());
        assert_eq!(config.backend, EstimationBackend::Vectorized);
    }

    #[test]
    fn test_validation() {
        let mut config = RatingConfig::default();
        config.tolerance = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.tolerance = f64::NAN;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.max_iterations = Some(0);
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.max_duration_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_budget_conversion() {
        let config = RatingConfig {
            max_iterations: Some(50),
            max_duration_seconds: Some(3),
            ..RatingConfig::default()
        };
        let budget = config.budget();
        assert_eq!(budget.max_iterations, Some(50));
        assert_eq!(budget.max_duration, Some(Duration::from_secs(3)));
    }
}
