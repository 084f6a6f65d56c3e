//! numerical_stability — guarded transforms and shared numeric tolerances.
//!
//! Purpose
//! -------
//! Collect the small numeric helpers every layer relies on when moving
//! between natural-space parameters and the unconstrained θ space, plus the
//! tolerances used for noise-scale floors and eigenvalue truncation.
//!
//! Key behaviors
//! -------------
//! - `safe_ln` / `safe_exp` implement the logarithmic re-parametrization
//!   without producing `-inf`, `inf`, or NaN on boundary inputs.
//! - `floor_sigma` applies [`SIGMA_FLOOR`] to Gaussian noise scales.
//! - [`EIGEN_EPS`] is shared by the covariance pseudo-inverse and the
//!   multivariate-normal square root.
//!
//! Conventions
//! -----------
//! - Pure functions on `f64`; no logging, I/O, or global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare against naïve formulas on a
//!   safe grid and check clamping at the edges.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, MAX_LOG_VALUE, POSITIVE_FLOOR, SIGMA_FLOOR, floor_sigma, safe_exp, safe_ln,
};

pub mod prelude {
    pub use super::transformations::{EIGEN_EPS, SIGMA_FLOOR, floor_sigma, safe_exp, safe_ln};
}
