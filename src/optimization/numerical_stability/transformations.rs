//! Numerical stability utilities.
//!
//! Guarded versions of the transforms used when moving positive parameters
//! between natural space and the unconstrained log space the optimizers and
//! samplers work in. Natural-space values that underflow to zero or arrive
//! negative are clamped to [`POSITIVE_FLOOR`] before the log so θ stays
//! finite; exponentials are capped at [`MAX_LOG_VALUE`] so the simulation
//! never sees `inf`.
//!
//! # Provided items
//! - [`EIGEN_EPS`]: eigenvalues at or below this are treated as zero when
//!   forming pseudo-inverses and matrix square roots.
//! - [`SIGMA_FLOOR`]: lower bound for Gaussian noise scales in the
//!   log-likelihood.
//! - [`safe_ln`] / [`safe_exp`]: the clamped log/exp pair.

/// Eigenvalue truncation threshold for pseudo-inverses and PSD square roots.
pub const EIGEN_EPS: f64 = 1e-10;

/// Lower bound applied to per-series noise scales σ.
pub const SIGMA_FLOOR: f64 = 1e-3;

/// Smallest positive value accepted by [`safe_ln`].
pub const POSITIVE_FLOOR: f64 = 1e-300;

/// Largest exponent passed to `exp` by [`safe_exp`]; `exp(700) ≈ 1e304`.
pub const MAX_LOG_VALUE: f64 = 700.0;

/// Natural log with the argument floored at [`POSITIVE_FLOOR`].
///
/// Non-finite inputs are returned unchanged so upstream validation can
/// report them.
pub fn safe_ln(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    x.max(POSITIVE_FLOOR).ln()
}

/// Exponential with the argument capped at [`MAX_LOG_VALUE`].
pub fn safe_exp(x: f64) -> f64 {
    x.min(MAX_LOG_VALUE).exp()
}

/// Noise scale with the [`SIGMA_FLOOR`] applied. NaN maps to the floor.
pub fn floor_sigma(sigma: f64) -> f64 {
    if sigma.is_nan() { SIGMA_FLOOR } else { sigma.max(SIGMA_FLOOR) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Agreement of the guarded transforms with the naïve formulas on safe
    // inputs and their clamping behavior at the edges.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `safe_exp(safe_ln(x)) == x` for ordinary positive values.
    fn ln_exp_agree_with_naive_on_safe_grid() {
        for &x in &[1e-8, 0.5, 1.0, 3.0, 1e6] {
            assert_relative_eq!(safe_exp(safe_ln(x)), x, max_relative = 1e-12);
            assert_relative_eq!(safe_ln(x), x.ln());
        }
    }

    #[test]
    // Purpose
    // -------
    // Zero and negative inputs are floored rather than producing -inf/NaN.
    fn safe_ln_floors_non_positive_inputs() {
        assert!(safe_ln(0.0).is_finite());
        assert_eq!(safe_ln(-1.0), POSITIVE_FLOOR.ln());
    }

    #[test]
    // Purpose
    // -------
    // Large exponents are capped so the result stays finite.
    fn safe_exp_caps_large_arguments() {
        assert!(safe_exp(1e6).is_finite());
        assert_eq!(safe_exp(1e6), MAX_LOG_VALUE.exp());
    }

    #[test]
    fn floor_sigma_respects_floor_and_nan() {
        assert_eq!(floor_sigma(0.0), SIGMA_FLOOR);
        assert_eq!(floor_sigma(f64::NAN), SIGMA_FLOOR);
        assert_eq!(floor_sigma(2.0), 2.0);
    }
}
