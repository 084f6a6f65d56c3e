//! inference — covariance estimates and Gaussian sampling in θ space.
//!
//! Purpose
//! -------
//! Provide the uncertainty-quantification building blocks the estimation
//! strategies share: observed-information covariances, sample moments,
//! name-based reordering of covariance blocks, and a multivariate normal
//! that tolerates semi-definite covariances.
//!
//! Key behaviors
//! -------------
//! - [`hessian::calc_covariance`]: pseudo-inverse of a finite-difference
//!   Hessian of the cost (Laplace strategy, posterior proposal scale).
//! - [`covariance::sample_moments`] / [`covariance::permute_to_order`]:
//!   moments of sample clouds and regression-block reordering.
//! - [`mvn::MultivariateNormal`]: eigen-factored sampling and fitting.
//!
//! Conventions
//! -----------
//! - Everything here works on plain `ndarray` vectors; parameter names and
//!   log-transforms belong to the window model's codec.
//! - Errors are [`InferenceError`] except where a Hessian is involved, which
//!   report [`OptError`](crate::optimization::errors::OptError).
pub mod covariance;
pub mod errors;
pub mod hessian;
pub mod mvn;

pub use self::covariance::{permute_to_order, sample_moments};
pub use self::errors::{InferenceError, InferenceResult};
pub use self::hessian::calc_covariance;
pub use self::mvn::MultivariateNormal;

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hessian::calc_covariance;
    pub use super::mvn::MultivariateNormal;
}
