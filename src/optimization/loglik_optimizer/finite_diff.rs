//! Numerical derivatives for objectives without analytic ones.
//!
//! `finitediff` wants plain `Fn(&Theta) -> f64` closures, while our
//! objectives are fallible. [`cost_gradient`] bridges the two by parking the
//! first evaluation error and handing `NaN` to the differencer; a parked
//! error always wins over whatever gradient came back.
//!
//! Both helpers try central differences first and fall back to forward
//! differences once when the central result is unusable. The laplace and
//! likelihood-sample strategies reach [`compute_hessian`] through
//! [`crate::inference::hessian`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of a fallible scalar function.
///
/// # Errors
/// The first error `f` returned during the forward pass, otherwise the
/// gradient validation error of the forward result.
pub fn cost_gradient<F>(theta: &Theta, f: F) -> OptResult<Grad>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let parked: RefCell<Option<OptError>> = RefCell::new(None);
    let scalar = |x: &Theta| match f(x) {
        Ok(v) => v,
        Err(e) => {
            parked.borrow_mut().get_or_insert(e);
            f64::NAN
        }
    };

    let central = theta.central_diff(&scalar);
    if parked.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }

    parked.replace(None);
    let forward = theta.forward_diff(&scalar);
    if let Some(err) = parked.take() {
        return Err(err);
    }
    validate_grad(&forward, theta.len())?;
    Ok(forward)
}

/// Symmetric finite-difference Hessian of the gradient map `grad` at `theta`.
///
/// # Errors
/// Shape or finiteness failures of the forward-difference fallback.
///
/// # Examples
/// ```rust
/// # use ndarray::Array1;
/// # use epi_window::optimization::loglik_optimizer::Theta;
/// # use epi_window::optimization::loglik_optimizer::finite_diff::compute_hessian;
/// let grad_fn = |theta: &Theta| theta.mapv(|x| 2.0 * x);
/// let theta: Theta = Array1::from(vec![1.0_f64, 2.0]);
/// let hess = compute_hessian(&grad_fn, &theta).unwrap();
/// assert_eq!(hess.shape(), &[2, 2]);
/// ```
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(grad: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let central = theta.central_hessian(grad);
    let mut hess = match validate_hessian(&central, dim) {
        Ok(()) => central,
        Err(_) => {
            let forward = theta.forward_hessian(grad);
            validate_hessian(&forward, dim)?;
            forward
        }
    };
    symmetrize(&mut hess);
    Ok(hess)
}

/// Average mirrored off-diagonal entries in place.
fn symmetrize(hess: &mut Hessian) {
    let n = hess.nrows();
    for i in 1..n {
        for j in 0..i {
            let mean = (hess[[i, j]] + hess[[j, i]]) / 2.0;
            hess[[i, j]] = mean;
            hess[[j, i]] = mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Error parking in `cost_gradient`, validation failures, and the
    // symmetric Hessian of a coupled quadratic.
    // -------------------------------------------------------------------------

    #[test]
    fn cost_gradient_of_sum_of_squares_is_twice_theta() {
        let theta: Theta = array![0.0, 1.0, -2.0];
        let grad = cost_gradient(&theta, |x: &Theta| Ok(x.dot(x))).expect("gradient");
        for i in 0..3 {
            assert_abs_diff_eq!(grad[i], 2.0 * theta[i], epsilon = 1e-5);
        }
    }

    #[test]
    // Purpose
    // -------
    // An evaluation error is returned as-is instead of a NaN gradient.
    //
    // Given
    // -----
    // - A function that fails once its argument leaves the unit interval.
    //
    // Expect
    // ------
    // - The function's own `NonFiniteCost` error.
    fn cost_gradient_returns_the_evaluation_error() {
        // Arrange
        let theta: Theta = array![1.0];
        let f = |x: &Theta| {
            if x[0] > 1.0 { Err(OptError::NonFiniteCost { value: f64::INFINITY }) } else { Ok(x[0]) }
        };

        // Act
        let err = cost_gradient(&theta, f).expect_err("evaluation error must surface");

        // Assert
        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A central gradient spoiled by an error is retried with forward
    // differences, which only step upward from θ.
    fn cost_gradient_falls_back_to_forward_differences() {
        let theta: Theta = array![0.0];
        let calls = Cell::new(0usize);
        let f = |x: &Theta| {
            calls.set(calls.get() + 1);
            if x[0] < 0.0 { Err(OptError::EmptyIndexSet) } else { Ok(3.0 * x[0]) }
        };

        let grad = cost_gradient(&theta, f).expect("forward fallback");

        assert_abs_diff_eq!(grad[0], 3.0, epsilon = 1e-6);
        assert!(calls.get() > 2);
    }

    #[test]
    fn non_finite_gradient_is_rejected() {
        let theta: Theta = Array1::from(vec![0.0_f64, 1.0]);
        let err = cost_gradient(&theta, |_: &Theta| Ok(f64::NAN)).expect_err("NaN gradient");
        assert!(matches!(err, OptError::InvalidGradient { .. }));
    }

    #[test]
    // Purpose
    // -------
    // `g(θ) = Aθ` yields a symmetric Hessian close to `A`.
    fn compute_hessian_recovers_coupled_quadratic() {
        let a = array![[2.0, 0.5], [0.5, 1.0]];
        let grad_fn = |theta: &Theta| a.dot(theta);

        let hess = compute_hessian(&grad_fn, &array![1.0, -2.0]).expect("hessian");

        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
        for ((i, j), &v) in hess.indexed_iter() {
            assert_abs_diff_eq!(v, a[[i, j]], epsilon = 1e-6);
        }
    }

    #[test]
    fn compute_hessian_rejects_non_finite_entries() {
        let grad_fn = |_: &Theta| Array1::from(vec![f64::NAN]);
        let err = compute_hessian(&grad_fn, &array![0.0]).expect_err("NaN Hessian");
        assert!(matches!(err, OptError::InvalidHessian { .. }));
    }

    #[test]
    fn symmetrize_averages_off_diagonal_pairs() {
        let mut h: Hessian = array![[1.0, 2.0], [0.0, 3.0]];
        symmetrize(&mut h);
        assert_eq!(h, array![[1.0, 1.0], [1.0, 3.0]]);
    }
}
