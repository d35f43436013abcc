//! Differential privacy primitives.
//!
//! Provides the [`PrivacyBudget`] value object and the [`NoiseEngine`]
//! that samples calibrated Laplace/Gaussian noise from the OS CSPRNG.

pub mod budget;
pub mod noise;

pub use budget::{NoiseError, NoiseMechanism, PrivacyBudget};
pub use noise::NoiseEngine;
