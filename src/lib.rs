//! epi_window — moving-window epidemic curve fitting with several
//! uncertainty-estimation strategies.
//!
//! Purpose
//! -------
//! Fit per-region curves of daily new cases and new deaths to an
//! exponential-growth model with day-of-week seasonality over a short
//! trailing window, estimate parameter uncertainty six independent ways,
//! and summarize the results for review.
//!
//! Key behaviors
//! -------------
//! - [`window`]: validated region series, the parameter codec, windows and
//!   time grid, simulation, likelihood, priors, options, and the per-region
//!   [`MovingWindowModel`](window::MovingWindowModel).
//! - [`estimation`]: regression, Laplace, bootstrap, likelihood-surface
//!   samples, random-walk Metropolis, and Bayesian posterior strategies.
//! - [`optimization`]: L-BFGS maximization of log-likelihoods with
//!   finite-difference derivatives.
//! - [`inference`]: observed-information covariances and multivariate
//!   normal sampling.
//! - [`cache`]: persisted posterior samples behind an explicit interface.
//! - [`report`]: parameter and forecast tables, box/whisker summaries.
//! - [`pipeline`]: batch driver over regions returning a run context.
//!
//! Invariants & assumptions
//! ------------------------
//! - One versioned parameter ordering per model; every strategy, the cache,
//!   and the reports index vectors through it.
//! - A strategy failure never aborts its model; a model failure never aborts
//!   the batch.
//! - Single-threaded, synchronous batch processing.
//!
//! Conventions
//! -----------
//! - Numerical code performs no I/O or logging. Orchestration, cache, and
//!   pipeline layers emit structured `tracing` events; installing a
//!   subscriber is left to the caller.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/` exercises regression
//!   recovery, failure containment, cache round trips, and the full batch.

pub mod cache;
pub mod estimation;
pub mod inference;
pub mod optimization;
pub mod pipeline;
pub mod report;
pub mod window;

pub mod prelude {
    pub use crate::cache::{CacheKey, CachedSamples, InMemoryCache, JsonFileCache, SampleCache};
    pub use crate::estimation::prelude::*;
    pub use crate::pipeline::{RunConfig, RunContext, run_regions};
    pub use crate::report::{ParameterReport, PredictionTable};
    pub use crate::window::prelude::*;
}
