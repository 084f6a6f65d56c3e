//! Posterior strategy (`PyMC3`): Bayesian regression per series, sampled by
//! Metropolis and persisted through the sample cache.
//!
//! Purpose
//! -------
//! For each series, sample the posterior of
//! `ln(y + offset) ~ N(a + b·x + Σ_{k=1..6} d_k·DOW_k, σ)` over the trailing
//! window, with the model's priors on `a`, `b`, `d_k` and `σ`, and turn each
//! joint draw into a natural-space parameter vector.
//!
//! Key behaviors
//! -------------
//! - Per-series θ is `[a, b, d1..d6, ln σ]`. The chain starts at the MAP
//!   point; the proposal is the Laplace covariance at the MAP scaled by
//!   `2.38² / d`, falling back to an isotropic `0.1²·I` when the curvature
//!   is unusable.
//! - Draw `i` of the positive chain is paired with draw `i` of the deceased
//!   chain. `intercept = exp(a)`, `day0 = 1`, `day_k = exp(d_k)`,
//!   `σ = exp(ln σ)`.
//! - With a cache attached, a hit is reused without sampling. On a miss the
//!   samples are computed only when the policy allows it, then written back.
//!
//! Invariants & assumptions
//! ------------------------
//! - A cache artifact with a different parameter ordering is a miss.
//! - A failed cache write is logged and does not fail the fit.
use crate::cache::{CacheKey, CachedSamples, SampleCache};
use crate::estimation::{
    errors::{StrategyError, StrategyResult},
    regression::{SeriesDesign, build_design, design_names},
    sampling::{ChainOutput, metropolis, resample_uniform},
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};
use crate::inference::{hessian::calc_covariance, mvn::MultivariateNormal};
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Cost, LogLikelihood, Theta, maximize, validation::validate_theta},
    numerical_stability::transformations::safe_exp,
};
use crate::window::core::{
    likelihood::gaussian_log_likelihood,
    params::{
        CANONICAL_ORDER_VERSION, DAYS_PER_WEEK, ParamOrder, ParamVector, ParameterSet,
        intercept_name, multiplier_name, sigma_name, slope_name,
    },
    priors::ResolvedPriors,
    series::Series,
};
use finitediff::FiniteDiff;
use ndarray::{Array1, Array2, s};
use tracing::{info, warn};

/// Fallback proposal scale when the MAP curvature is unusable.
const FALLBACK_STEP: f64 = 0.1;

/// Optimal random-walk scaling constant.
const RW_SCALE: f64 = 2.38;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosteriorStrategy;

impl EstimationStrategy for PosteriorStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Posterior
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        let problem = ctx.problem;
        let options = problem.options();
        let policy = options.cache_policy;
        let key = CacheKey::new(
            problem.series().region(),
            problem.model_type_name(),
            problem.series().last_date(),
            self.kind().abbreviation(),
        );

        if !policy.force_recompute {
            if let Some(hit) = lookup(ctx.cache, &key, problem.codec().order()) {
                let (raw, log_probs) = hit;
                let resampled = resample_uniform(&mut *ctx.rng, &raw, options.n_samples);
                let weights = vec![1.0; raw.len()];
                return Ok(WeightedSamples { resampled, raw, weights, log_probs, skipped: 0 });
            }
        }
        if !(policy.allow_compute || policy.force_recompute) {
            return Err(StrategyError::CacheUnavailable {
                reason: format!("no cached samples for {key} and computing is disabled"),
            });
        }

        let positive = sample_series(ctx, Series::Positive)?;
        let deceased = sample_series(ctx, Series::Deceased)?;

        let mut raw = Vec::with_capacity(positive.states.len());
        let mut log_probs = Vec::with_capacity(positive.states.len());
        let mut skipped = 0;
        for (p, d) in positive.states.iter().zip(deceased.states.iter()) {
            let mut named = ParameterSet::new();
            insert_series_draw(&mut named, Series::Positive, p);
            insert_series_draw(&mut named, Series::Deceased, d);
            let vector = problem.codec().to_vector(&named)?;
            match problem.log_likelihood(&vector, None) {
                Ok(lp) => {
                    raw.push(vector);
                    log_probs.push(lp);
                }
                Err(_) => skipped += 1,
            }
        }
        if raw.is_empty() {
            return Err(StrategyError::NonConvergence {
                reason: "no posterior draw could be scored".into(),
            });
        }

        if let Some(cache) = ctx.cache {
            let artifact = CachedSamples::from_samples(problem.codec().order(), &raw, &log_probs);
            if let Err(e) = cache.put(&key, &artifact) {
                warn!(key = %key, error = %e, "posterior.cache_write_failed");
            }
        }

        let resampled = resample_uniform(&mut *ctx.rng, &raw, options.n_samples);
        let weights = vec![1.0; raw.len()];
        Ok(WeightedSamples { resampled, raw, weights, log_probs, skipped })
    }
}

/// Cached samples for `key`, or `None` on any miss or unusable artifact.
fn lookup(
    cache: Option<&dyn SampleCache>, key: &CacheKey, order: &ParamOrder,
) -> Option<(Vec<ParamVector>, Vec<f64>)> {
    let cache = cache?;
    match cache.get(key) {
        Ok(Some(artifact)) => match artifact.into_samples(order) {
            Ok(unpacked) if !unpacked.0.is_empty() => Some(unpacked),
            Ok(_) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "posterior.cache_rejected");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key = %key, error = %e, "posterior.cache_lookup_failed");
            None
        }
    }
}

/// Names of the per-series θ entries: design coefficients then `σ`.
pub fn series_order(series: Series) -> OptResult<ParamOrder> {
    let mut names = design_names(series);
    names.push(sigma_name(series));
    ParamOrder::new(CANONICAL_ORDER_VERSION, names)
        .map_err(|e| OptError::RejectedParameters { text: e.to_string() })
}

/// Log posterior density of one series' Bayesian regression.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorObjective<'a> {
    design: &'a SeriesDesign,
    priors: ResolvedPriors,
}

impl<'a> PosteriorObjective<'a> {
    pub fn new(design: &'a SeriesDesign, priors: ResolvedPriors) -> Self {
        Self { design, priors }
    }

    pub fn dim(&self) -> usize {
        self.design.x.ncols() + 1
    }
}

impl LogLikelihood for PosteriorObjective<'_> {
    type Data = ();

    fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
        let p = self.design.x.ncols();
        let beta = theta.slice(s![..p]);
        let sigma = safe_exp(theta[p]);
        let residuals = &self.design.y - &self.design.x.dot(&beta);
        let n = residuals.len() as f64;
        let ll = gaussian_log_likelihood(&residuals.to_vec(), sigma)
            - 0.5 * n * (2.0 * std::f64::consts::PI).ln();
        let total = ll + self.priors.log_density(theta);
        if !total.is_finite() {
            return Err(OptError::NonFiniteCost { value: total });
        }
        Ok(total)
    }

    fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
        validate_theta(theta, self.dim())
    }
}

/// MAP, proposal, and Metropolis chain for one series.
fn sample_series(ctx: &mut FitContext<'_>, series: Series) -> StrategyResult<ChainOutput> {
    let problem = ctx.problem;
    let options = problem.options();
    let design = build_design(problem, series);
    let order = series_order(series)?;
    let priors = options.priors.resolve(&order)?;
    let objective = PosteriorObjective::new(&design, priors);
    let dim = objective.dim();

    let mut theta0 = Array1::<f64>::zeros(dim);
    theta0[0] = design.y.mean().unwrap_or(0.0);
    let map = maximize(&objective, theta0, &(), &options.mle_opts)?;

    let proposal = proposal_covariance(&objective, &map.theta_hat);
    let step = MultivariateNormal::new(Array1::zeros(dim), proposal)?;
    let target = |theta: &Theta| objective.value(theta, &()).ok();
    let chain = metropolis(
        &mut *ctx.rng,
        map.theta_hat,
        target,
        &step,
        options.posterior.tune,
        options.posterior.draws,
    )?;
    info!(
        series = series.label(),
        acceptance = chain.acceptance_rate(),
        draws = chain.states.len(),
        "posterior.chain_done"
    );
    Ok(chain)
}

/// Scaled Laplace covariance at `theta_hat`, or the isotropic fallback.
fn proposal_covariance(objective: &PosteriorObjective<'_>, theta_hat: &Theta) -> Array2<f64> {
    let dim = theta_hat.len();
    let cost = |theta: &Theta| objective.value(theta, &()).map_or(f64::NAN, |v| -v);
    let grad = |theta: &Theta| theta.central_diff(&cost);
    match calc_covariance(&grad, theta_hat) {
        Ok(cov) if cov.diag().iter().all(|&v| v.is_finite() && v > 0.0) => {
            cov * (RW_SCALE * RW_SCALE / dim as f64)
        }
        _ => Array2::eye(dim) * (FALLBACK_STEP * FALLBACK_STEP),
    }
}

/// Natural-space values of one per-series θ draw.
fn insert_series_draw(named: &mut ParameterSet, series: Series, theta: &Theta) {
    named.insert(intercept_name(series), safe_exp(theta[0]));
    named.insert(slope_name(series), theta[1]);
    named.insert(multiplier_name(0, series), 1.0);
    for day in 1..DAYS_PER_WEEK {
        named.insert(multiplier_name(day, series), safe_exp(theta[1 + day]));
    }
    named.insert(sigma_name(series), safe_exp(theta[DAYS_PER_WEEK + 1]));
}
