//! Run configuration loaded from YAML.
//!
//! A run is fully described by its depth, its seed and its [`ParameterSet`].
//! Every key is optional; missing keys take the defaults below.
//!
//! ```yaml
//! levels: 8
//! seed: 42
//! params:
//!   p0: 0.05
//!   eps: 0.30
//!   k: 2.0
//!   alpha: 0.70
//!   eta: 0.50
//!   beta: 0.02
//! ```
//!
//! The `SPONGE_SEED` environment variable overrides `seed`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sponge_types::{CensusState, SimulationState};
use tracing::warn;

use crate::params::ParameterSet;
use crate::runner::{self, RunError};

/// Environment variable that overrides [`RunConfig::seed`].
pub const SEED_ENV: &str = "SPONGE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Everything needed to reproduce one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of steps `T`. The run yields `T + 1` states.
    #[serde(default = "default_levels")]
    pub levels: u32,

    /// Seed of the run's single random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Model constants. Validated when the run starts, not when loaded.
    #[serde(default)]
    pub params: ParameterSet,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            seed: default_seed(),
            params: ParameterSet::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Replace `seed` with `SPONGE_SEED` when it is set.
    pub fn apply_env_overrides(&mut self) {
        self.override_seed(std::env::var(SEED_ENV).ok().as_deref());
    }

    fn override_seed(&mut self, value: Option<&str>) {
        let Some(raw) = value else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(_) => warn!(
                var = SEED_ENV,
                value = raw,
                "Ignoring seed override: not an unsigned integer"
            ),
        }
    }

    /// Run the configured simulation with a full point cloud.
    ///
    /// # Errors
    ///
    /// See [`runner::run`].
    pub fn run(&self) -> Result<Vec<SimulationState>, RunError> {
        runner::run(self.levels, &self.params, self.seed)
    }

    /// Run the configured simulation keeping counts only.
    ///
    /// # Errors
    ///
    /// See [`runner::run_census`].
    pub fn run_census(&self) -> Result<Vec<CensusState>, RunError> {
        runner::run_census(self.levels, &self.params, self.seed)
    }
}

const fn default_levels() -> u32 {
    8
}

const fn default_seed() -> u64 {
    42
}
