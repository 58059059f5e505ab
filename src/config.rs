//! Configuration
//!
//! Search tuning shared by the library, the session worker and the CLI, plus the CLI's logging
//! settings.

use std::{fs, path::Path, time::Duration};

use clap::Args;
use serde::Deserialize;
use thiserror::Error;

use crate::{scoring::ScoreWeights, solvers::exact::budget::TimeBudget};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Thinning rate outside `0.0..=1.0`
    #[error("thinning rate must be between 0 and 1, got {0}")]
    ThinningRate(f64),

    /// Thinning starts after the deadline
    #[error("thinning starts at {thinning_after_ms}ms, after the {deadline_ms}ms deadline")]
    ThinningAfterDeadline {
        /// Elapsed time at which thinning starts
        thinning_after_ms: u64,
        /// Elapsed time at which the search stops
        deadline_ms: u64,
    },

    /// A score weight is NaN or infinite
    #[error("score weight {0} must be finite")]
    Weight(&'static str),
}

/// Search tuning.
///
/// Every field has a default, so a YAML file only needs to name what it changes:
///
/// ```yaml
/// deadline_ms: 2000
/// weights:
///   diversity: 4.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Elapsed milliseconds after which internal frames start being skipped at random
    pub thinning_after_ms: u64,

    /// Elapsed milliseconds after which the search stops
    pub deadline_ms: u64,

    /// Chance of skipping an internal frame once thinning has started
    pub thinning_rate: f64,

    /// Number of best solutions to keep
    pub keep: usize,

    /// Score weights
    pub weights: ScoreWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thinning_after_ms: 5_000,
            deadline_ms: 10_000,
            thinning_rate: 0.2,
            keep: 25,
            weights: ScoreWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Parse a config from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the values are invalid.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(contents)?;

        config.validate()
    }

    /// Load a config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the values are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid value.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&self.thinning_rate) {
            return Err(ConfigError::ThinningRate(self.thinning_rate));
        }

        if self.thinning_after_ms > self.deadline_ms {
            return Err(ConfigError::ThinningAfterDeadline {
                thinning_after_ms: self.thinning_after_ms,
                deadline_ms: self.deadline_ms,
            });
        }

        let weights = [
            ("diversity", self.weights.diversity),
            ("price_balance", self.weights.price_balance),
            ("count_balance", self.weights.count_balance),
        ];

        if let Some((name, _)) = weights.iter().find(|(_, weight)| !weight.is_finite()) {
            return Err(ConfigError::Weight(*name));
        }

        Ok(self)
    }

    /// Time budget for the enumerator.
    pub fn budget(&self) -> TimeBudget {
        TimeBudget::new(
            Duration::from_millis(self.thinning_after_ms),
            Duration::from_millis(self.deadline_ms),
            self.thinning_rate,
        )
    }
}

/// Command-line overrides for [`SearchConfig`].
#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    /// Milliseconds after which the search starts thinning
    #[arg(long, env = "TALLY_THINNING_AFTER_MS")]
    pub thinning_after_ms: Option<u64>,

    /// Milliseconds after which the search stops
    #[arg(long, env = "TALLY_DEADLINE_MS")]
    pub deadline_ms: Option<u64>,

    /// Chance of skipping a frame while thinning (0.0 - 1.0)
    #[arg(long, env = "TALLY_THINNING_RATE")]
    pub thinning_rate: Option<f64>,

    /// Number of best solutions to keep
    #[arg(short, long, env = "TALLY_KEEP")]
    pub keep: Option<usize>,
}

impl SearchArgs {
    /// Apply any overrides on top of `config`.
    pub fn apply(&self, config: SearchConfig) -> SearchConfig {
        SearchConfig {
            thinning_after_ms: self.thinning_after_ms.unwrap_or(config.thinning_after_ms),
            deadline_ms: self.deadline_ms.unwrap_or(config.deadline_ms),
            thinning_rate: self.thinning_rate.unwrap_or(config.thinning_rate),
            keep: self.keep.unwrap_or(config.keep),
            weights: config.weights,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
