//! Resampling and Metropolis helpers shared by the sampling strategies.
//!
//! - [`resample_uniform`]: `n` draws with replacement.
//! - [`resample_weighted`]: `n` draws with replacement, probability
//!   proportional to `weights`.
//! - [`metropolis`]: random-walk Metropolis in θ space with a Gaussian
//!   proposal; the first `tune` states are discarded.
//!
//! The log target returns `None` for points it cannot score; those proposals
//! are rejected.
use crate::estimation::errors::{StrategyError, StrategyResult};
use crate::inference::mvn::MultivariateNormal;
use crate::optimization::loglik_optimizer::Theta;
use rand::{Rng, distributions::{Distribution, WeightedIndex}};

/// `n` draws from `items` with replacement.
pub fn resample_uniform<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T], n: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    (0..n).map(|_| items[rng.gen_range(0..items.len())].clone()).collect()
}

/// `n` draws from `items` with probability proportional to `weights`.
///
/// # Errors
/// - `NonConvergence` when the weights are empty, negative, non-finite, or
///   all zero.
pub fn resample_weighted<T: Clone, R: Rng + ?Sized>(
    rng: &mut R, items: &[T], weights: &[f64], n: usize,
) -> StrategyResult<Vec<T>> {
    let dist = WeightedIndex::new(weights)
        .map_err(|e| StrategyError::NonConvergence { reason: format!("invalid weights: {e}") })?;
    Ok((0..n).map(|_| items[dist.sample(rng)].clone()).collect())
}

/// Retained chain states and their log targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutput {
    pub states: Vec<Theta>,
    pub log_targets: Vec<f64>,
    pub accepted: usize,
    pub proposed: usize,
}

impl ChainOutput {
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed == 0 { 0.0 } else { self.accepted as f64 / self.proposed as f64 }
    }
}

/// Random-walk Metropolis from `start`.
///
/// `step` must be a zero-mean proposal of the same dimension as `start`.
/// Runs `tune + draws` steps and keeps the last `draws` states.
///
/// # Errors
/// - `NonConvergence` when the log target is not finite at `start`.
pub fn metropolis<R, F>(
    rng: &mut R, start: Theta, log_target: F, step: &MultivariateNormal, tune: usize,
    draws: usize,
) -> StrategyResult<ChainOutput>
where
    R: Rng + ?Sized,
    F: Fn(&Theta) -> Option<f64>,
{
    let mut current_lp = match log_target(&start) {
        Some(lp) if lp.is_finite() => lp,
        _ => {
            return Err(StrategyError::NonConvergence {
                reason: "log target is not finite at the chain start".into(),
            });
        }
    };
    let mut current = start;
    let mut out = ChainOutput {
        states: Vec::with_capacity(draws),
        log_targets: Vec::with_capacity(draws),
        accepted: 0,
        proposed: 0,
    };

    for i in 0..tune + draws {
        let candidate = &current + &step.sample(rng);
        out.proposed += 1;
        if let Some(lp) = log_target(&candidate).filter(|lp| lp.is_finite()) {
            let log_u: f64 = rng.gen::<f64>().ln();
            if log_u < lp - current_lp {
                current = candidate;
                current_lp = lp;
                out.accepted += 1;
            }
        }
        if i >= tune {
            out.states.push(current.clone());
            out.log_targets.push(current_lp);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Resampling edge cases and weighting, and a Metropolis chain on a
    // standard normal target whose moments are checked loosely.
    // -------------------------------------------------------------------------

    #[test]
    fn resample_uniform_handles_empty_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let out: Vec<i32> = resample_uniform(&mut rng, &[], 5);
        assert!(out.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Zero-weight items are never drawn.
    fn resample_weighted_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(2);
        let out = resample_weighted(&mut rng, &["a", "b", "c"], &[0.0, 1.0, 0.0], 50).expect("draws");
        assert!(out.iter().all(|s| *s == "b"));
        assert!(resample_weighted(&mut rng, &["a"], &[0.0], 1).is_err());
    }

    #[test]
    // Purpose
    // -------
    // The chain targets a standard normal.
    //
    // Given
    // -----
    // - log target −x²/2, proposal sd 1, 2 000 tune + 20 000 draws.
    //
    // Expect
    // ------
    // - 20 000 states, mean within 0.1 of 0, variance within 0.2 of 1.
    fn metropolis_samples_standard_normal() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(3);
        let step = MultivariateNormal::new(Array1::zeros(1), Array2::eye(1)).expect("proposal");
        let target = |t: &Theta| Some(-0.5 * t[0] * t[0]);

        // Act
        let out = metropolis(&mut rng, array![2.0], target, &step, 2_000, 20_000).expect("chain");

        // Assert
        assert_eq!(out.states.len(), 20_000);
        let n = out.states.len() as f64;
        let mean = out.states.iter().map(|s| s[0]).sum::<f64>() / n;
        let var = out.states.iter().map(|s| (s[0] - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var - 1.0).abs() < 0.2, "var {var}");
        assert!(out.acceptance_rate() > 0.2);
    }

    #[test]
    fn metropolis_rejects_unscorable_start() {
        let mut rng = StdRng::seed_from_u64(4);
        let step = MultivariateNormal::new(Array1::zeros(1), Array2::eye(1)).expect("proposal");
        let err = metropolis(&mut rng, array![0.0], |_| None, &step, 1, 1).expect_err("bad start");
        assert!(matches!(err, StrategyError::NonConvergence { .. }));
    }
}
