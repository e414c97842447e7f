//! Scheduler configuration.
//!
//! Load the platform size, time horizon and formulation from TOML so
//! experiments can be rerun without code changes.
//!
//! # Examples
//!
//! ```
//! use dataflow_mapsched::config::{SchedulerConfig, StartEncoding};
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     cores = 4
//!     horizon = 32
//!     encoding = "big_m"
//! "#).unwrap();
//!
//! assert_eq!(config.cores, 4);
//! assert_eq!(config.encoding, StartEncoding::BigM);
//! assert_eq!(config.model_name, "OptimalMappingScheduling");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default name given to solver models.
pub const DEFAULT_MODEL_NAME: &str = "OptimalMappingScheduling";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How actor start times are encoded in the MILP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartEncoding {
    /// One binary per (actor, start slot) plus per-slot occupancy binaries.
    /// No big-M constant; `O(T)` variables per actor.
    #[default]
    TimeIndexed,

    /// One integer start per actor plus pairwise ordering binaries and
    /// big-M disjunctions. Fewer variables, weaker LP relaxation.
    BigM,
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Number of identical cores.
    pub cores: usize,

    /// Number of time slots in the horizon.
    pub horizon: u32,

    /// Start-time encoding.
    #[serde(default)]
    pub encoding: StartEncoding,

    /// Name given to each solver model.
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl SchedulerConfig {
    /// Creates a configuration with the default encoding.
    pub fn new(cores: usize, horizon: u32) -> Self {
        Self {
            cores,
            horizon,
            encoding: StartEncoding::default(),
            model_name: default_model_name(),
        }
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the start-time encoding.
    pub fn with_encoding(mut self, encoding: StartEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the solver model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Checks that the platform and horizon are non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cores == 0 {
            return Err(ConfigError::Invalid("cores must be at least 1".into()));
        }
        if self.horizon == 0 {
            return Err(ConfigError::Invalid("horizon must be at least 1".into()));
        }
        Ok(())
    }
}
