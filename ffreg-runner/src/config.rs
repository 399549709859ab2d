//! Serializable regression configuration.

use chrono::NaiveDate;
use ffreg_core::domain::RISK_FREE_COLUMN;
use ffreg_core::regression::DEFAULT_CONFIDENCE_LEVEL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a regression run (content-addressable hash).
pub type RunId = String;

/// Default chart location, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "imgs/fama_french_coefficients.svg";

/// Configuration errors, raised before any data is fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("confidence level must be strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    #[error("no factors selected")]
    EmptyFactors,

    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

fn default_risk_free_column() -> String {
    RISK_FREE_COLUMN.to_string()
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

/// Everything needed to reproduce one regression report.
///
/// Dates follow the price provider convention: `start` inclusive, `end`
/// exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegressionConfig {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub factor_file: PathBuf,
    pub factors: Vec<String>,
    #[serde(default = "default_risk_free_column")]
    pub risk_free_column: String,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl RegressionConfig {
    /// Build a validated config with default risk-free column, confidence
    /// level and output path.
    pub fn new(
        ticker: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        factor_file: impl Into<PathBuf>,
        factors: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            ticker: ticker.into(),
            start,
            end,
            factor_file: factor_file.into(),
            factors,
            risk_free_column: default_risk_free_column(),
            confidence_level: default_confidence_level(),
            output_path: default_output_path(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_risk_free_column(mut self, column: impl Into<String>) -> Self {
        self.risk_free_column = column.into();
        self
    }

    pub fn with_confidence_level(mut self, level: f64) -> Result<Self, ConfigError> {
        self.confidence_level = level;
        self.validate()?;
        Ok(self)
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks. Factor names are checked against the factor file
    /// later, once it is loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::EmptyTicker);
        }
        if self.start >= self.end {
            return Err(ConfigError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::InvalidConfidence(self.confidence_level));
        }
        if self.factors.is_empty() {
            return Err(ConfigError::EmptyFactors);
        }
        Ok(())
    }

    /// Deterministic hash of the config. Identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
