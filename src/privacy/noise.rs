//! Calibrated noise sampling for differential privacy.
//!
//! Samples are drawn from the OS CSPRNG (`OsRng`), never from a seeded or
//! counter-based generator, so an observer cannot reconstruct the noise
//! stream and subtract it from published statistics.
//!
//! # Mechanisms
//! - **Laplace**: `Lap(0, sensitivity/epsilon)` via the inverse CDF.
//!   Satisfies pure epsilon-DP.
//! - **Gaussian**: `N(0, sigma^2)` with
//!   `sigma = sqrt(2 ln(1.25/delta)) * sensitivity / epsilon`, sampled via
//!   the Box-Muller transform. Satisfies (epsilon, delta)-DP.

use rand::rngs::OsRng;
use rand::Rng;

use super::budget::{NoiseError, NoiseMechanism, PrivacyBudget};

/// Stateless sampler for calibrated random noise.
///
/// Every call draws fresh randomness, so concurrent use requires no
/// synchronization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseEngine;

impl NoiseEngine {
    pub fn new() -> Self {
        Self
    }

    /// Draw one noise sample calibrated to `budget`.
    ///
    /// The budget is re-validated first; an invalid budget is rejected
    /// before any randomness is consumed.
    pub fn sample(&self, budget: &PrivacyBudget) -> Result<f64, NoiseError> {
        budget.validate()?;
        metrics::counter!("mindvault_noise_samples_total").increment(1);
        let noise = match budget.mechanism {
            NoiseMechanism::Laplace => sample_laplace(budget.laplace_scale()),
            NoiseMechanism::Gaussian => budget.gaussian_sigma() * sample_standard_normal(),
        };
        Ok(noise)
    }

    /// Add calibrated noise to `value` and clamp the result at zero.
    ///
    /// The clamp is policy: counts and rates cannot be negative. The
    /// pre-clamp value is never returned, logged, or otherwise exposed.
    pub fn apply_privacy(&self, value: f64, budget: &PrivacyBudget) -> Result<f64, NoiseError> {
        let noised = value + self.sample(budget)?;
        Ok(noised.max(0.0))
    }
}

/// Sample `Lap(0, scale)`: draw `u ~ Uniform(-0.5, 0.5)` and return
/// `-scale * sign(u) * ln(1 - 2|u|)`.
///
/// Draws where `1 - 2|u|` rounds to zero are rejected so `ln` never sees
/// a zero argument.
fn sample_laplace(scale: f64) -> f64 {
    let mut rng = OsRng;
    loop {
        let u: f64 = rng.gen::<f64>() - 0.5;
        let t = 1.0 - 2.0 * u.abs();
        if t > 0.0 {
            return -scale * u.signum() * t.ln();
        }
    }
}

/// Sample a standard normal via Box-Muller from two independent uniforms.
fn sample_standard_normal() -> f64 {
    let mut rng = OsRng;
    loop {
        let u1: f64 = rng.gen::<f64>();
        if u1 > 0.0 {
            let u2: f64 = rng.gen::<f64>();
            return (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        }
    }
}

#[cfg(test)]
#[path = "noise_tests.rs"]
mod tests;
