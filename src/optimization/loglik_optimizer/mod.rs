//! loglik_optimizer — L-BFGS maximization of log-likelihoods over `θ`.
//!
//! Purpose
//! -------
//! Give the laplace, bootstrap, random-walk and posterior strategies one way
//! to find a maximum: implement [`LogLikelihood`] and call [`maximize`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] presents `−ℓ(θ)` to argmin.
//! - [`maximize`] checks the start, builds L-BFGS with the configured line
//!   search and tolerances, runs it, and returns an [`OptimOutcome`].
//! - [`finite_diff`] fills in gradients and Hessians numerically;
//!   [`validation`] holds the shape and finiteness checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives return `ℓ`, never the cost; [`OptimOutcome::value`] is `ℓ(θ̂)`.
//! - Domain violations come back as
//!   [`OptError`](crate::optimization::errors::OptError) values.
//! - `θ` is unconstrained; the window model's codec owns the mapping to
//!   natural parameters.

pub mod adapter;
pub mod api;
pub mod finite_diff;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
