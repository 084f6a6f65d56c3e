//! Random-walk strategy (`MCMC`): Metropolis on the penalized
//! log-likelihood in θ space.
//!
//! The chain starts at the shared optimum and proposes isotropic Gaussian
//! steps of `random_walk.step_size`. The first `random_walk.burn_in` states
//! are discarded; the remaining `n_steps − burn_in` states form the raw
//! sample set and `n_samples` draws are resampled from it uniformly.
use crate::estimation::{
    errors::{StrategyError, StrategyResult},
    sampling::{metropolis, resample_uniform},
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};
use crate::inference::mvn::MultivariateNormal;
use crate::optimization::loglik_optimizer::{LogLikelihood, Theta};
use ndarray::{Array1, Array2};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomWalkStrategy;

impl EstimationStrategy for RandomWalkStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RandomWalk
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        let mle = ctx.ensure_mle()?;
        let problem = ctx.problem;
        let rw = problem.options().random_walk;
        let dim = mle.theta_hat.len();
        let step = MultivariateNormal::new(
            Array1::zeros(dim),
            Array2::eye(dim) * (rw.step_size * rw.step_size),
        )?;
        let objective = ctx.quiet_objective();
        let selection = problem.default_selection();
        let target = |theta: &Theta| objective.value(theta, &selection).ok();

        let chain = metropolis(
            &mut *ctx.rng,
            mle.theta_hat,
            target,
            &step,
            rw.burn_in,
            rw.n_steps - rw.burn_in,
        )?;

        let mut raw = Vec::with_capacity(chain.states.len());
        let mut log_probs = Vec::with_capacity(chain.states.len());
        let mut skipped = 0;
        let mut previous: Option<(Theta, f64)> = None;
        for theta in chain.states {
            let natural = problem.codec().to_natural(&theta)?;
            // Rejected proposals repeat the previous state.
            let lp = match &previous {
                Some((t, lp)) if *t == theta => Ok(*lp),
                _ => problem.log_likelihood(&natural, None),
            };
            match lp {
                Ok(lp) => {
                    raw.push(natural);
                    log_probs.push(lp);
                    previous = Some((theta, lp));
                }
                Err(_) => skipped += 1,
            }
        }

        if raw.is_empty() {
            return Err(StrategyError::NonConvergence {
                reason: "no chain state could be scored".into(),
            });
        }
        let resampled = resample_uniform(&mut *ctx.rng, &raw, problem.options().n_samples);
        let weights = vec![1.0; raw.len()];
        Ok(WeightedSamples { resampled, raw, weights, log_probs, skipped })
    }
}
