//! Laplace strategy (`Hess`): Gaussian approximation at the optimum.
//!
//! Takes the shared maximum of the penalized log-likelihood, builds the
//! covariance as the eigen-truncated pseudo-inverse of the finite-difference
//! observed information, samples that Gaussian in θ space, and decodes.
use crate::estimation::{
    errors::{StrategyError, StrategyResult},
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};
use crate::inference::{hessian::calc_covariance, mvn::MultivariateNormal};
use crate::optimization::loglik_optimizer::{LogLikelihood, Theta};
use finitediff::FiniteDiff;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaplaceStrategy;

impl EstimationStrategy for LaplaceStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Laplace
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        let mle = ctx.ensure_mle()?;
        let problem = ctx.problem;
        let objective = ctx.quiet_objective();
        let selection = problem.default_selection();

        let cost = |theta: &Theta| objective.value(theta, &selection).map_or(f64::NAN, |v| -v);
        let grad = |theta: &Theta| theta.central_diff(&cost);
        let cov = calc_covariance(&grad, &mle.theta_hat)?;
        let mvn = MultivariateNormal::new(mle.theta_hat, cov)?;

        let n = problem.options().n_samples;
        let mut raw = Vec::with_capacity(n);
        let mut log_probs = Vec::with_capacity(n);
        let mut skipped = 0;
        for theta in mvn.sample_n(&mut *ctx.rng, n) {
            let natural = problem.codec().to_natural(&theta)?;
            match problem.log_likelihood(&natural, None) {
                Ok(lp) => {
                    raw.push(natural);
                    log_probs.push(lp);
                }
                Err(_) => skipped += 1,
            }
        }
        if raw.is_empty() {
            return Err(StrategyError::NonConvergence {
                reason: "no Laplace draw could be scored".into(),
            });
        }
        let mut samples = WeightedSamples::uniform(raw, log_probs);
        samples.skipped = skipped;
        Ok(samples)
    }
}
