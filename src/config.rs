//! Configuration for testbench runs.
//!
//! Run parameters can be loaded declaratively from YAML or JSON files and
//! applied to a scheduler before the run starts.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   max_time: 200
//!   delta_limit: 1000
//!   log_level: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::scheduler::DEFAULT_DELTA_LIMIT;
use crate::types::SimTime;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Run parameters for a scheduler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimParams {
    /// Maximum simulated time budget. Absent means no limit.
    #[serde(default)]
    pub max_time: Option<SimTime>,

    /// Delta iterations allowed per instant before the run aborts with a
    /// combinational-loop error.
    #[serde(default = "default_delta_limit")]
    pub delta_limit: u32,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_delta_limit() -> u32 {
    DEFAULT_DELTA_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_time: None,
            delta_limit: default_delta_limit(),
            log_level: default_log_level(),
        }
    }
}

/// Top-level configuration file contents.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Global run parameters.
    #[serde(default)]
    pub simulation: SimParams,
}

impl SimConfig {
    /// Loads configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Loads configuration from a file, detecting the format from the
    /// extension (`.yaml`/`.yml` or `.json`).
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Serializes this configuration to a YAML string.
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.simulation.delta_limit == 0 {
            return Err(ConfigError::Validation(
                "delta_limit must be at least 1".to_string(),
            ));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.simulation.log_level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log_level '{}'",
                self.simulation.log_level
            )));
        }

        Ok(())
    }
}
