//! Finiteness and shape checks shared by the optimizer, the finite-difference
//! helpers, and the window likelihood.
//!
//! Every vector check reports the first offending entry so callers can name
//! the parameter by its index in the model's ordering.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// Optional tolerances must be finite and strictly positive when present.
///
/// # Errors
/// [`OptError::InvalidSetting`] naming `name`.
pub fn check_tolerance(name: &'static str, tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(t) if !t.is_finite() || t <= 0.0 => Err(OptError::InvalidSetting {
            name,
            value: t.to_string(),
            reason: "tolerances must be finite and > 0",
        }),
        _ => Ok(()),
    }
}

/// Counts such as iteration caps and L-BFGS memory must be at least one.
pub fn check_count(name: &'static str, count: Option<usize>) -> OptResult<()> {
    match count {
        Some(0) => Err(OptError::InvalidSetting {
            name,
            value: "0".to_string(),
            reason: "must be at least 1",
        }),
        _ => Ok(()),
    }
}

fn first_non_finite(values: &Theta) -> Option<(usize, f64)> {
    values.iter().copied().enumerate().find(|(_, v)| !v.is_finite())
}

/// # Errors
/// [`OptError::GradientDimMismatch`] or [`OptError::InvalidGradient`].
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match first_non_finite(grad) {
        Some((index, value)) => Err(OptError::InvalidGradient { index, value }),
        None => Ok(()),
    }
}

/// Unwrap the optimizer's best point, rejecting absent or non-finite ones.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    match first_non_finite(&theta) {
        Some((index, value)) => Err(OptError::InvalidThetaHat { index, value }),
        None => Ok(theta),
    }
}

/// Log-likelihood values may be any finite number.
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

/// Length is checked before finiteness.
///
/// # Errors
/// [`OptError::ThetaLengthMismatch`] or [`OptError::InvalidThetaInput`].
pub fn validate_theta(theta: &Theta, dim: usize) -> OptResult<()> {
    if theta.len() != dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
    }
    match first_non_finite(theta) {
        Some((index, value)) => Err(OptError::InvalidThetaInput { index, value }),
        None => Ok(()),
    }
}

/// # Errors
/// [`OptError::HessianDimMismatch`] unless `dim × dim`, then
/// [`OptError::InvalidHessian`] for the first non-finite entry in row order.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    let shape = (hessian.nrows(), hessian.ncols());
    if shape != (dim, dim) {
        return Err(OptError::HessianDimMismatch { expected: dim, found: shape });
    }
    match hessian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}
