//! Similarity Metric: per-node circular agreement between two phase vectors
//!
//! score = (mean_i cos(a_i - b_i) + 1) / 2
//!
//! The score is not rotation-invariant. Recall targets an
//! absolute phase assignment, so a globally rotated copy of the target does
//! not count as converged.

use anyhow::{ensure, Result};
use std::f64::consts::PI;

/// Mean of cos(a_i - b_i), in [-1, 1]. Empty vectors give 0.
pub fn mean_alignment(a: &[f64], b: &[f64]) -> Result<f64> {
    ensure!(
        a.len() == b.len(),
        "Phase vectors differ in length ({} vs {})",
        a.len(),
        b.len()
    );
    if a.is_empty() {
        return Ok(0.0);
    }
    let total: f64 = a.iter().zip(b).map(|(x, y)| (x - y).cos()).sum();
    Ok(total / a.len() as f64)
}

/// Convergence score in [0, 1]: 1 = identical, 0.5 = uncorrelated, 0 = anti-phase
pub fn similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.is_empty() && b.is_empty() {
        return Ok(0.0);
    }
    let alignment = mean_alignment(a, b)?;
    Ok(((alignment + 1.0) / 2.0).clamp(0.0, 1.0))
}

/// Shift every phase by π
pub fn antiphase(phases: &[f64]) -> Vec<f64> {
    phases.iter().map(|p| p + PI).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::TAU;

    fn random_phases(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen::<f64>() * TAU).collect()
    }

    #[test]
    fn test_reflexive() {
        let v = random_phases(500, 1);
        assert!((similarity(&v, &v).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_antiphase_scores_zero() {
        let v = random_phases(500, 2);
        let anti = antiphase(&v);
        assert!(similarity(&v, &anti).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_wrapped_phases_agree() {
        let v = vec![0.1, 1.0, 3.0];
        let wrapped: Vec<f64> = v.iter().map(|p| p + TAU).collect();
        assert!((similarity(&v, &wrapped).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uncorrelated_is_near_half() {
        let a = random_phases(20_000, 3);
        let b = random_phases(20_000, 4);
        let score = similarity(&a, &b).unwrap();
        assert!((score - 0.5).abs() < 0.02, "score {}", score);
    }

    #[test]
    fn test_not_rotation_invariant() {
        let v = random_phases(100, 5);
        let rotated: Vec<f64> = v.iter().map(|p| p + PI / 2.0).collect();
        assert!((similarity(&v, &rotated).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        assert!(similarity(&[0.0, 1.0], &[0.0]).is_err());
        assert_eq!(similarity(&[], &[]).unwrap(), 0.0);
        assert_eq!(mean_alignment(&[], &[]).unwrap(), 0.0);
    }
}
