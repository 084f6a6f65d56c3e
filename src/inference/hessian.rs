//! inference::hessian — covariance of a mode from its observed information.
//!
//! Purpose
//! -------
//! The laplace strategy and the posterior proposal both need `J(θ̂)⁺`, the
//! pseudo-inverse of the cost Hessian at a mode. [`calc_covariance`]
//! differences the supplied cost gradient once more and inverts the result
//! through a symmetric eigendecomposition.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient map is of the cost `−ℓ(θ)`, so a proper maximum gives a
//!   positive semi-definite `J`.
//! - Eigenvalues at or below [`EIGEN_EPS`] are dropped. A window that never
//!   sees some weekday leaves that multiplier unidentified, and the dropped
//!   direction then carries zero variance instead of an unbounded one.
use crate::optimization::{
    errors::OptResult, loglik_optimizer::finite_diff::compute_hessian,
    numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// `J(θ̂)⁺` for the cost whose gradient map is `grad`.
///
/// # Errors
/// Shape or finiteness failures from [`compute_hessian`].
///
/// # Examples
/// ```rust
/// # use ndarray::array;
/// # use epi_window::inference::hessian::calc_covariance;
/// let a = array![[4.0, 0.0], [0.0, 1.0]];
/// let f = |theta: &ndarray::Array1<f64>| a.dot(theta);
/// let cov = calc_covariance(&f, &array![1.0, -1.0]).unwrap();
/// assert!((cov[[0, 0]] - 0.25).abs() < 1e-6);
/// assert!((cov[[1, 1]] - 1.0).abs() < 1e-6);
/// ```
pub fn calc_covariance<F: Fn(&Array1<f64>) -> Array1<f64>>(
    grad: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array2<f64>> {
    let info = compute_hessian(grad, theta_hat)?;
    Ok(truncated_inverse(&info))
}

/// `Σ_{λ_k > EIGEN_EPS} q_k q_kᵀ / λ_k` for a symmetric `m = Q Λ Qᵀ`.
fn truncated_inverse(m: &Array2<f64>) -> Array2<f64> {
    let n = m.nrows();
    let eigen = DMatrix::from_fn(n, n, |i, j| m[[i, j]]).symmetric_eigen();
    let mut inv = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        let q = eigen.eigenvectors.column(k);
        for ((i, j), entry) in inv.indexed_iter_mut() {
            *entry += q[i] * q[j] / lambda;
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Inversion of known information matrices, including a rank-deficient
    // one whose flat direction must be dropped.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A coupled quadratic cost yields the analytic inverse of its matrix.
    //
    // Given
    // -----
    // - cost(θ) = ½ θᵀ A θ with A = [[2, 1], [1, 2]], gradient A θ.
    //
    // Expect
    // ------
    // - cov ≈ A⁻¹ = (1/3)[[2, −1], [−1, 2]].
    fn calc_covariance_inverts_coupled_quadratic() {
        // Arrange
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let f = |theta: &Array1<f64>| a.dot(theta);

        // Act
        let cov = calc_covariance(&f, &array![0.3, -0.7]).expect("covariance");

        // Assert
        let expected = array![[2.0, -1.0], [-1.0, 2.0]] / 3.0;
        for ((i, j), &v) in cov.indexed_iter() {
            assert_abs_diff_eq!(v, expected[[i, j]], epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // A flat direction contributes zero variance instead of blowing up.
    //
    // Given
    // -----
    // - A = [[1, 1], [1, 1]] (rank 1, flat along (1, −1)).
    //
    // Expect
    // ------
    // - A⁺ = A / 4.
    fn truncated_inverse_drops_null_space() {
        let inv = truncated_inverse(&array![[1.0, 1.0], [1.0, 1.0]]);
        for &v in inv.iter() {
            assert_abs_diff_eq!(v, 0.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn non_finite_information_is_rejected() {
        let f = |_: &Array1<f64>| array![f64::NAN];
        assert!(calc_covariance(&f, &array![0.0]).is_err());
    }
}
