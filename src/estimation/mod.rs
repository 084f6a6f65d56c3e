//! estimation — the six parameter-estimation strategies.
//!
//! Purpose
//! -------
//! Turn a configured [`WindowProblem`](crate::window::models::problem::WindowProblem)
//! into parameter samples by six independent routes, each of which either
//! succeeds with samples or fails on its own without affecting the others.
//!
//! Key behaviors
//! -------------
//! - [`regression`] (`SM`): per-series OLS on log counts, Gaussian over θ.
//! - [`laplace`] (`Hess`): Gaussian at the penalized-likelihood optimum with
//!   the pseudo-inverse observed information as covariance.
//! - [`bootstrap`] (`BS`): re-maximize on resampled window indices.
//! - [`likelihood_samples`] (`LS`): reweight every objective evaluation
//!   recorded so far by its likelihood.
//! - [`random_walk`] (`MCMC`): Metropolis on the penalized likelihood.
//! - [`posterior`] (`PyMC3`): Bayesian per-series regression sampled by
//!   Metropolis, read from and written to the sample cache.
//! - [`strategy::Strategy`] dispatches from a [`StrategyKind`] to its
//!   implementation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Strategies run in [`StrategyKind::ALL`] order. Laplace and random walk
//!   share one maximum-likelihood run through
//!   [`SharedFitState`](traits::SharedFitState); likelihood samples read the
//!   evaluations recorded by the strategies before it.
//! - All samples are natural-space vectors in the codec's ordering.
//!
//! Conventions
//! -----------
//! - Randomness comes only from the model's seeded RNG passed in
//!   [`FitContext`], so a fixed seed reproduces every sample set.
pub mod bootstrap;
pub mod errors;
pub mod laplace;
pub mod likelihood_samples;
pub mod posterior;
pub mod random_walk;
pub mod regression;
pub mod sampling;
pub mod strategy;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use self::errors::{StrategyError, StrategyResult};
pub use self::strategy::Strategy;
pub use self::traits::{
    EstimationStrategy, FitContext, SharedFitState, StrategyFit, StrategyKind, StrategyStatus,
    WeightedSamples,
};

pub mod prelude {
    pub use super::errors::{StrategyError, StrategyResult};
    pub use super::strategy::Strategy;
    pub use super::traits::{EstimationStrategy, StrategyKind, StrategyStatus, WeightedSamples};
}
