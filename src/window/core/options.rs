//! Model options — configuration for windowing, fitting, and sampling.
//!
//! Purpose
//! -------
//! Collect every knob of a moving-window fit in one validated place:
//! window geometry, the log offset, strategy selection and budgets, priors,
//! the posterior cache policy, and optimizer options.
//!
//! Key behaviors
//! -------------
//! - [`ModelOptions::default`] documents the reference configuration.
//! - [`ModelOptions::validate`] rejects out-of-range values; model
//!   construction calls it before anything else.
//! - [`ModelOptions::model_type_name`] is the stable configuration label used
//!   in cache keys and reports.
//!
//! Conventions
//! -----------
//! - Budgets are plain counts (samples, replicates, chain steps).
//! - Sub-option structs are plain data; only [`ModelOptions::validate`]
//!   imposes constraints.
use crate::estimation::traits::StrategyKind;
use crate::optimization::loglik_optimizer::MLEOptions;
use crate::window::{
    core::{params::default_log_params, priors::Priors},
    errors::{ModelError, ModelResult},
};
use std::collections::BTreeSet;

/// Reload/compute policy for cached posterior samples.
///
/// `force_recompute` skips the lookup and always recomputes. Otherwise a
/// cache hit is used; on a miss the samples are computed only when
/// `allow_compute` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub allow_compute: bool,
    pub force_recompute: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { allow_compute: true, force_recompute: false }
    }
}

/// Bootstrap budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub n_bootstraps: usize,
    /// L-BFGS iteration cap per replicate.
    pub max_iter: usize,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self { n_bootstraps: 100, max_iter: 100 }
    }
}

/// Random-walk Metropolis budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkOptions {
    pub n_steps: usize,
    pub burn_in: usize,
    /// Proposal standard deviation per θ coordinate.
    pub step_size: f64,
}

impl Default for RandomWalkOptions {
    fn default() -> Self {
        Self { n_steps: 6000, burn_in: 1000, step_size: 0.02 }
    }
}

/// Posterior sampler budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosteriorOptions {
    pub draws: usize,
    pub tune: usize,
}

impl Default for PosteriorOptions {
    fn default() -> Self {
        Self { draws: 2000, tune: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// Days in the trailing moving window.
    pub window_size: usize,
    /// Added to counts before taking logs.
    pub log_offset: f64,
    /// Grid steps simulated before the first observation.
    pub burn_in: usize,
    /// Grid steps simulated after the last observation.
    pub forecast_horizon: usize,
    /// Strategies `run_fits` attempts, in this set; execution order is fixed.
    pub strategies: Vec<StrategyKind>,
    /// Resampled draws each strategy returns.
    pub n_samples: usize,
    pub seed: u64,
    pub bootstrap: BootstrapOptions,
    pub random_walk: RandomWalkOptions,
    pub posterior: PosteriorOptions,
    pub priors: Priors,
    /// Add the prior penalty to optimizer-based objectives.
    pub use_priors: bool,
    pub log_params: BTreeSet<String>,
    pub cache_policy: CachePolicy,
    pub mle_opts: MLEOptions,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            window_size: 14,
            log_offset: 0.1,
            burn_in: 20,
            forecast_horizon: 30,
            strategies: StrategyKind::ALL.to_vec(),
            n_samples: 1000,
            seed: 42,
            bootstrap: BootstrapOptions::default(),
            random_walk: RandomWalkOptions::default(),
            posterior: PosteriorOptions::default(),
            priors: Priors::default(),
            use_priors: true,
            log_params: default_log_params(),
            cache_policy: CachePolicy::default(),
            mle_opts: MLEOptions::default(),
        }
    }
}

impl ModelOptions {
    /// # Errors
    /// - `InvalidOption` naming the first offending field.
    pub fn validate(&self) -> ModelResult<()> {
        if self.window_size == 0 {
            return Err(ModelError::InvalidOption { name: "window_size", reason: "must be >= 1" });
        }
        if !self.log_offset.is_finite() || self.log_offset <= 0.0 {
            return Err(ModelError::InvalidOption {
                name: "log_offset",
                reason: "must be finite and > 0",
            });
        }
        if self.n_samples == 0 {
            return Err(ModelError::InvalidOption { name: "n_samples", reason: "must be >= 1" });
        }
        if self.bootstrap.n_bootstraps == 0 || self.bootstrap.max_iter == 0 {
            return Err(ModelError::InvalidOption {
                name: "bootstrap",
                reason: "replicates and iteration cap must be >= 1",
            });
        }
        let rw = &self.random_walk;
        if rw.n_steps <= rw.burn_in {
            return Err(ModelError::InvalidOption {
                name: "random_walk",
                reason: "n_steps must exceed burn_in",
            });
        }
        if !rw.step_size.is_finite() || rw.step_size <= 0.0 {
            return Err(ModelError::InvalidOption {
                name: "random_walk.step_size",
                reason: "must be finite and > 0",
            });
        }
        if self.posterior.draws == 0 {
            return Err(ModelError::InvalidOption { name: "posterior.draws", reason: "must be >= 1" });
        }
        Ok(())
    }

    /// `moving_window_{W}_days`.
    pub fn model_type_name(&self) -> String {
        format!("moving_window_{}_days", self.window_size)
    }

    pub fn includes(&self, kind: StrategyKind) -> bool {
        self.strategies.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Defaults, the configuration label, and one rejection per validated
    // field group.
    // -------------------------------------------------------------------------

    #[test]
    fn defaults_validate_and_name_the_model() {
        let opts = ModelOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.model_type_name(), "moving_window_14_days");
        assert_eq!(opts.strategies.len(), 6);
        assert_eq!(opts.cache_policy, CachePolicy { allow_compute: true, force_recompute: false });
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let cases: Vec<(ModelOptions, &str)> = vec![
            (ModelOptions { window_size: 0, ..ModelOptions::default() }, "window_size"),
            (ModelOptions { log_offset: -1.0, ..ModelOptions::default() }, "log_offset"),
            (ModelOptions { log_offset: 0.0, ..ModelOptions::default() }, "log_offset"),
            (ModelOptions { n_samples: 0, ..ModelOptions::default() }, "n_samples"),
            (
                ModelOptions {
                    random_walk: RandomWalkOptions { n_steps: 10, burn_in: 10, step_size: 0.1 },
                    ..ModelOptions::default()
                },
                "random_walk",
            ),
        ];
        for (opts, field) in cases {
            match opts.validate() {
                Err(ModelError::InvalidOption { name, .. }) => assert_eq!(name, field),
                other => panic!("expected InvalidOption for {field}, got {other:?}"),
            }
        }
    }
}
