//! Likelihood-surface strategy (`LS`): importance resampling of every
//! objective evaluation recorded so far.
//!
//! Each logged point gets weight `exp(objective − max objective)`; the
//! `n_samples` draws are taken with replacement by weight. The raw set is
//! the whole log, with its data log-likelihoods as `log_probs`.
use crate::estimation::{
    errors::{StrategyError, StrategyResult},
    sampling::resample_weighted,
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikelihoodSampleStrategy;

impl EstimationStrategy for LikelihoodSampleStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LikelihoodSamples
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        let evaluations = ctx.evaluations.snapshot();
        if evaluations.is_empty() {
            return Err(StrategyError::MissingDependency {
                what: "objective evaluations from an earlier optimizer run",
            });
        }
        let codec = ctx.problem.codec();
        let max = evaluations.iter().map(|e| e.objective).fold(f64::NEG_INFINITY, f64::max);

        let mut raw = Vec::with_capacity(evaluations.len());
        let mut weights = Vec::with_capacity(evaluations.len());
        let mut log_probs = Vec::with_capacity(evaluations.len());
        for e in &evaluations {
            raw.push(codec.to_natural(&e.theta)?);
            weights.push((e.objective - max).exp());
            log_probs.push(e.log_likelihood);
        }
        let resampled =
            resample_weighted(&mut *ctx.rng, &raw, &weights, ctx.problem.options().n_samples)?;
        Ok(WeightedSamples { resampled, raw, weights, log_probs, skipped: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::test_support::{Harness, growing_problem, mean_of, mle_value};
    use crate::window::core::options::ModelOptions;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Reweighting of the evaluations logged by an optimizer run, and the
    // failure when nothing was logged.
    // -------------------------------------------------------------------------

    #[test]
    fn likelihood_samples_need_logged_evaluations() {
        let problem = growing_problem(ModelOptions::default());
        let mut harness = Harness::new(1);

        let err = LikelihoodSampleStrategy
            .estimate(&mut harness.context(&problem))
            .expect_err("empty log");

        assert!(matches!(err, StrategyError::MissingDependency { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Evaluations from the maximum-likelihood run concentrate on its optimum.
    //
    // Given
    // -----
    // - The shared optimizer run on 30 growing days, 300 requested samples.
    //
    // Expect
    // ------
    // - One raw entry per logged evaluation, the best weighted 1.
    // - 300 resampled draws; mean positive slope within 0.005 of the MLE.
    fn likelihood_samples_reweight_optimizer_evaluations() {
        // Arrange
        let problem = growing_problem(ModelOptions { n_samples: 300, ..ModelOptions::default() });
        let mut harness = Harness::new(3);
        harness.context(&problem).ensure_mle().expect("mle");
        let logged = harness.evaluations.snapshot().len();

        // Act
        let samples =
            LikelihoodSampleStrategy.estimate(&mut harness.context(&problem)).expect("ls");

        // Assert
        assert_eq!(samples.raw.len(), logged);
        assert_eq!(samples.len(), 300);
        assert_eq!(samples.weights.iter().copied().fold(0.0, f64::max), 1.0);
        let mle = mle_value(&problem, &harness.shared, "positive_slope");
        let mean = mean_of(&problem, &samples.resampled, "positive_slope");
        assert!((mean - mle).abs() < 5e-3, "mean {mean} vs mle {mle}");
    }
}
