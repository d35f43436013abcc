//! Tests for the noise engine.

use super::*;
use crate::privacy::budget::{NoiseError, PrivacyBudget};

const SAMPLES: usize = 20_000;

#[test]
fn test_invalid_budget_rejected_before_sampling() {
    let engine = NoiseEngine::new();
    let bad = PrivacyBudget { epsilon: 0.0, ..PrivacyBudget::default() };
    assert!(matches!(engine.sample(&bad), Err(NoiseError::InvalidEpsilon(_))));
    assert!(matches!(
        engine.apply_privacy(5.0, &bad),
        Err(NoiseError::InvalidEpsilon(_))
    ));
}

#[test]
fn test_laplace_noise_is_centered() {
    let engine = NoiseEngine::new();
    let budget = PrivacyBudget::laplace(1.0).unwrap();
    let mean: f64 = (0..SAMPLES)
        .map(|_| engine.sample(&budget).unwrap())
        .sum::<f64>()
        / SAMPLES as f64;
    // scale 1.0 => variance 2, std of the mean ~ 0.01; 0.2 is a wide margin
    assert!(mean.abs() < 0.2, "laplace mean drifted: {mean}");
}

#[test]
fn test_gaussian_noise_is_centered() {
    let engine = NoiseEngine::new();
    let budget = PrivacyBudget::gaussian(1.0, 1.0e-5).unwrap();
    let mean: f64 = (0..SAMPLES)
        .map(|_| engine.sample(&budget).unwrap())
        .sum::<f64>()
        / SAMPLES as f64;
    // sigma ~ 4.84, std of the mean ~ 0.034; 0.6 is a wide margin
    assert!(mean.abs() < 0.6, "gaussian mean drifted: {mean}");
}

#[test]
fn test_laplace_spread_tracks_scale() {
    let engine = NoiseEngine::new();
    let tight = PrivacyBudget::laplace(10.0).unwrap();
    let loose = PrivacyBudget::laplace(0.1).unwrap();
    let spread = |b: &PrivacyBudget| -> f64 {
        (0..2_000)
            .map(|_| engine.sample(b).unwrap().abs())
            .sum::<f64>()
            / 2_000.0
    };
    assert!(spread(&loose) > spread(&tight));
}

#[test]
fn test_apply_privacy_never_negative() {
    let engine = NoiseEngine::new();
    let budget = PrivacyBudget::laplace(0.1).unwrap();
    for _ in 0..2_000 {
        let noised = engine.apply_privacy(0.5, &budget).unwrap();
        assert!(noised >= 0.0);
    }
}

#[test]
fn test_apply_privacy_is_unbiased_above_clamp() {
    // far from zero the clamp never fires, so the mean must converge on
    // the true value
    let engine = NoiseEngine::new();
    let budget = PrivacyBudget::laplace(1.0).unwrap();
    let value = 1_000.0;
    let mean: f64 = (0..SAMPLES)
        .map(|_| engine.apply_privacy(value, &budget).unwrap())
        .sum::<f64>()
        / SAMPLES as f64;
    assert!((mean - value).abs() < 0.5, "noised mean drifted: {mean}");
}

#[test]
fn test_samples_are_not_constant() {
    let engine = NoiseEngine::new();
    let budget = PrivacyBudget::gaussian(1.0, 1.0e-5).unwrap();
    let first = engine.sample(&budget).unwrap();
    let distinct = (0..100)
        .map(|_| engine.sample(&budget).unwrap())
        .any(|s| (s - first).abs() > f64::EPSILON);
    assert!(distinct);
}

#[test]
fn test_samples_are_finite() {
    let engine = NoiseEngine::new();
    for budget in [
        PrivacyBudget::laplace(0.01).unwrap(),
        PrivacyBudget::gaussian(0.01, 1.0e-9).unwrap(),
    ] {
        for _ in 0..2_000 {
            assert!(engine.sample(&budget).unwrap().is_finite());
        }
    }
}
