//! Main application configuration
//!
//! This module defines the top-level configuration for the rating tool,
//! including environment variable loading, TOML file loading and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub output: OutputSettings,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Result presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Number of competitors shown in the table (0 shows everyone)
    pub display_limit: usize,
    /// Where the full normalized ranking is written, if anywhere
    pub out_file: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "pl-ranking".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            display_limit: 40,
            out_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(tolerance) = env::var("RATING_TOLERANCE") {
            self.rating.tolerance = tolerance
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_TOLERANCE value: {}", tolerance))?;
        }
        if let Ok(max_iterations) = env::var("RATING_MAX_ITERATIONS") {
            self.rating.max_iterations = Some(max_iterations.parse().map_err(|_| {
                anyhow!("Invalid RATING_MAX_ITERATIONS value: {}", max_iterations)
            })?);
        }
        if let Ok(max_seconds) = env::var("RATING_MAX_SECONDS") {
            self.rating.max_duration_seconds = Some(
                max_seconds
                    .parse()
                    .map_err(|_| anyhow!("Invalid RATING_MAX_SECONDS value: {}", max_seconds))?,
            );
        }
        if let Ok(backend) = env::var("RATING_BACKEND") {
            self.rating.backend = backend
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_BACKEND value: {}", backend))?;
        }
        if let Ok(anchor) = env::var("RATING_ANCHOR") {
            self.rating.anchor_competitor = anchor
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_ANCHOR value: {}", anchor))?;
        }

        // Output settings
        if let Ok(limit) = env::var("DISPLAY_LIMIT") {
            self.output.display_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid DISPLAY_LIMIT value: {}", limit))?;
        }
        if let Ok(out_file) = env::var("RATINGS_OUT_FILE") {
            self.output.out_file = Some(PathBuf::from(out_file));
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;

    Ok(())
}
