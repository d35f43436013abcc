//! Engine configuration.
//!
//! Configuration is explicit and passed in; there is no global mutable
//! state. `from_env` layers `MINDVAULT_*` overrides on top of the
//! defaults and validates the result.

use thiserror::Error;

use crate::analytics::DEFAULT_MIN_COHORT_SIZE;
use crate::audit::AuditorConfig;
use crate::crypto::{DEFAULT_KEY_ITERATIONS, MIN_KEY_ITERATIONS};
use crate::privacy::{NoiseError, NoiseMechanism, PrivacyBudget};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
    #[error(transparent)]
    Budget(#[from] NoiseError),
    #[error("key iteration count {0} below minimum {MIN_KEY_ITERATIONS}")]
    IterationsTooLow(u32),
    #[error("minimum cohort size {0} is too small to protect individuals")]
    CohortTooSmall(usize),
}

/// Configuration for a [`crate::PrivacyEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Smallest cohort whose statistics may be published.
    pub min_cohort_size: usize,
    /// Budget applied to every published statistic.
    pub default_budget: PrivacyBudget,
    /// PBKDF2 rounds for newly encrypted data.
    pub key_iterations: u32,
    pub audit: AuditorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_cohort_size: DEFAULT_MIN_COHORT_SIZE,
            default_budget: PrivacyBudget::default(),
            key_iterations: DEFAULT_KEY_ITERATIONS,
            audit: AuditorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with `MINDVAULT_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = read_env("MINDVAULT_MIN_COHORT_SIZE") {
            config.min_cohort_size = parse_env("MINDVAULT_MIN_COHORT_SIZE", &v)?;
        }
        if let Some(v) = read_env("MINDVAULT_KEY_ITERATIONS") {
            config.key_iterations = parse_env("MINDVAULT_KEY_ITERATIONS", &v)?;
        }
        if let Some(v) = read_env("MINDVAULT_EPSILON") {
            config.default_budget.epsilon = parse_env("MINDVAULT_EPSILON", &v)?;
        }
        if let Some(v) = read_env("MINDVAULT_DELTA") {
            config.default_budget.delta = parse_env("MINDVAULT_DELTA", &v)?;
        }
        if let Some(v) = read_env("MINDVAULT_MECHANISM") {
            config.default_budget.mechanism = match v.as_str() {
                "laplace" => NoiseMechanism::Laplace,
                "gaussian" => NoiseMechanism::Gaussian,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "MINDVAULT_MECHANISM",
                        value: v,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_budget.validate()?;
        if self.key_iterations < MIN_KEY_ITERATIONS {
            return Err(ConfigError::IterationsTooLow(self.key_iterations));
        }
        if self.min_cohort_size < 2 {
            return Err(ConfigError::CohortTooSmall(self.min_cohort_size));
        }
        Ok(())
    }
}

fn read_env(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value: value.to_string() })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
