//! Bootstrap strategy (`BS`): refits on resampled window indices.
//!
//! Each replicate draws both windows' indices with replacement, maximizes
//! the penalized log-likelihood on that selection (capped at
//! `bootstrap.max_iter` iterations, warm-started from the regression point
//! or the default start), and keeps the optimum. Failed replicates are
//! counted in `skipped`; if none succeed the strategy fails.
use crate::estimation::{
    errors::{StrategyError, StrategyResult},
    sampling::resample_uniform,
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};
use crate::optimization::loglik_optimizer::maximize;
use crate::window::core::likelihood::IndexSelection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapStrategy;

impl EstimationStrategy for BootstrapStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Bootstrap
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        let problem = ctx.problem;
        let options = problem.options();
        let theta0 = ctx.warm_start()?;
        let opts = options.mle_opts.with_max_iter(options.bootstrap.max_iter)?;
        let objective = ctx.quiet_objective();
        let positive = problem.windows().positive.indices();
        let deceased = problem.windows().deceased.indices();

        let attempted = options.bootstrap.n_bootstraps;
        let mut raw = Vec::with_capacity(attempted);
        let mut log_probs = Vec::with_capacity(attempted);
        let mut skipped = 0;
        for _ in 0..attempted {
            let selection = IndexSelection {
                positive: resample_uniform(&mut *ctx.rng, &positive, positive.len()),
                deceased: resample_uniform(&mut *ctx.rng, &deceased, deceased.len()),
            };
            let refit = maximize(&objective, theta0.clone(), &selection, &opts)
                .ok()
                .and_then(|out| problem.codec().to_natural(&out.theta_hat).ok())
                .and_then(|natural| {
                    problem.log_likelihood(&natural, None).ok().map(|lp| (natural, lp))
                });
            match refit {
                Some((natural, lp)) => {
                    raw.push(natural);
                    log_probs.push(lp);
                }
                None => skipped += 1,
            }
        }
        if raw.is_empty() {
            return Err(StrategyError::NoSuccessfulReplicates { attempted });
        }

        let resampled = resample_uniform(&mut *ctx.rng, &raw, options.n_samples);
        let weights = vec![1.0; raw.len()];
        Ok(WeightedSamples { resampled, raw, weights, log_probs, skipped })
    }
}
