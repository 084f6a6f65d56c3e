//! window — the moving-window epidemic curve model.
//!
//! Purpose
//! -------
//! Fit a per-region exponential-growth curve with day-of-week seasonality to
//! the trailing window of daily new cases and new deaths, and orchestrate
//! the estimation strategies against it.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds the validated input ([`RegionSeries`]), the parameter
//!   naming and codec ([`ParamCodec`]), windows and time grid, the pure
//!   simulation and likelihood functions, priors, and options.
//! - [`models`] builds the immutable [`WindowProblem`], its penalized
//!   objective, and the stateful [`MovingWindowModel`].
//! - [`errors`] defines [`ModelError`], fatal for the region it is raised for.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter vectors follow one versioned [`ParamOrder`] per model; every
//!   strategy, the cache, and the reports read positions from it.
//! - Natural-space vectors ([`ParamVector`]) and optimizer vectors (`Theta`)
//!   are distinct types; only the codec converts between them.
//!
//! Conventions
//! -----------
//! - Series index `i` is `first_date + i` days and grid step `i + burn_in`.
//! - Day-of-week of grid step `k` is `k mod 7` in simulation, regression,
//!   and posterior alike.
pub mod core;
pub mod errors;
pub mod models;

pub use self::core::{
    options::{CachePolicy, ModelOptions},
    params::{ParamCodec, ParamOrder, ParamVector, ParameterSet},
    series::{RegionSeries, Series},
};
pub use self::errors::{ModelError, ModelResult};
pub use self::models::{FitState, MovingWindowModel, WindowProblem};

pub mod prelude {
    pub use super::core::options::{CachePolicy, ModelOptions};
    pub use super::core::params::{ParamCodec, ParamOrder, ParamVector, ParameterSet};
    pub use super::core::priors::{Prior, Priors};
    pub use super::core::series::{RegionSeries, Series};
    pub use super::errors::{ModelError, ModelResult};
    pub use super::models::{MovingWindowModel, WindowProblem};
}
