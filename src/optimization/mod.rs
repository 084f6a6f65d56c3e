//! optimization — maximum-likelihood machinery and guarded numeric transforms.
//!
//! Purpose
//! -------
//! Everything a strategy needs to locate a mode of a window log-likelihood
//! or posterior without touching argmin directly.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: [`maximize`](loglik_optimizer::maximize) and its
//!   settings, plus finite-difference derivatives.
//! - `numerical_stability`: clamped `exp`/`ln` for the log-scale positive
//!   parameters, the residual σ floor, and the eigenvalue cutoff.
//! - `errors`: [`OptError`](errors::OptError) for every failure above.
//!
//! Conventions
//! -----------
//! - Maximize `ℓ(θ)`; the cost `−ℓ(θ)` never leaves the adapter.
//! - No I/O and no logging in this layer.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
