//! Privacy budget value object.
//!
//! A [`PrivacyBudget`] fixes the noise mechanism and its calibration
//! parameters for a batch of published statistics. Budgets are validated
//! on construction and again before sampling, so invalid parameters are
//! rejected before any noise is drawn. Once attached to a report a budget
//! is never modified.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default privacy loss bound.
pub const DEFAULT_EPSILON: f64 = 1.0;
/// Default failure probability for the Gaussian mechanism.
pub const DEFAULT_DELTA: f64 = 1.0e-5;
/// Default L1 sensitivity (counts and rates change by at most 1 per user).
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

/// Validation failures for noise parameters.
///
/// All variants are caller-fixable and raised before any sampling occurs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoiseError {
    #[error("epsilon must be a finite value > 0, got {0}")]
    InvalidEpsilon(f64),
    #[error("delta must be a finite value in (0, 1), got {0}")]
    InvalidDelta(f64),
    #[error("sensitivity must be a finite value > 0, got {0}")]
    InvalidSensitivity(f64),
}

/// Noise distribution used to perturb published statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseMechanism {
    Laplace,
    Gaussian,
}

impl std::fmt::Display for NoiseMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseMechanism::Laplace => write!(f, "laplace"),
            NoiseMechanism::Gaussian => write!(f, "gaussian"),
        }
    }
}

/// Calibration parameters for differentially private noise.
///
/// Smaller epsilon means more noise, stronger privacy, and weaker utility.
/// `delta` only enters the Gaussian calibration but is kept in range for
/// both mechanisms so a budget can be re-targeted without re-validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrivacyBudget {
    pub epsilon: f64,
    pub delta: f64,
    pub sensitivity: f64,
    pub mechanism: NoiseMechanism,
}

impl PrivacyBudget {
    /// Construct a validated budget.
    pub fn new(
        epsilon: f64,
        delta: f64,
        sensitivity: f64,
        mechanism: NoiseMechanism,
    ) -> Result<Self, NoiseError> {
        let budget = Self { epsilon, delta, sensitivity, mechanism };
        budget.validate()?;
        Ok(budget)
    }

    /// Laplace budget with the default delta and sensitivity.
    pub fn laplace(epsilon: f64) -> Result<Self, NoiseError> {
        Self::new(epsilon, DEFAULT_DELTA, DEFAULT_SENSITIVITY, NoiseMechanism::Laplace)
    }

    /// Gaussian budget with the default sensitivity.
    pub fn gaussian(epsilon: f64, delta: f64) -> Result<Self, NoiseError> {
        Self::new(epsilon, delta, DEFAULT_SENSITIVITY, NoiseMechanism::Gaussian)
    }

    /// Re-check the invariants. Used at every sampling site so budgets
    /// deserialized from external input cannot bypass validation.
    pub fn validate(&self) -> Result<(), NoiseError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(NoiseError::InvalidEpsilon(self.epsilon));
        }
        if !self.delta.is_finite() || self.delta <= 0.0 || self.delta >= 1.0 {
            return Err(NoiseError::InvalidDelta(self.delta));
        }
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(NoiseError::InvalidSensitivity(self.sensitivity));
        }
        Ok(())
    }

    /// Scale parameter `b = sensitivity / epsilon` of the Laplace mechanism.
    pub fn laplace_scale(&self) -> f64 {
        self.sensitivity / self.epsilon
    }

    /// Standard deviation `sigma = sqrt(2 ln(1.25/delta)) * sensitivity / epsilon`
    /// of the Gaussian mechanism.
    pub fn gaussian_sigma(&self) -> f64 {
        (2.0 * (1.25 / self.delta).ln()).sqrt() * self.sensitivity / self.epsilon
    }
}

impl Default for PrivacyBudget {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            delta: DEFAULT_DELTA,
            sensitivity: DEFAULT_SENSITIVITY,
            mechanism: NoiseMechanism::Laplace,
        }
    }
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
