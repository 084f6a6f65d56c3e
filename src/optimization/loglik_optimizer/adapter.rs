//! Bridge from [`LogLikelihood`] to argmin's problem traits.
//!
//! argmin minimizes, so the adapter serves `c(θ) = −ℓ(θ)` as the cost and
//! `−∇ℓ(θ)` as the gradient. Objectives without an analytic gradient get a
//! finite-difference gradient of the cost itself, which already carries the
//! sign.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        finite_diff::cost_gradient,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// `−ℓ(θ)`; a non-finite `ℓ` is an error rather than a cost.
    fn negated(&self, theta: &Theta) -> OptResult<Cost> {
        let ll = self.f.value(theta, self.data)?;
        if ll.is_finite() { Ok(-ll) } else { Err(OptError::NonFiniteCost { value: ll }) }
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.negated(theta)?)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                Ok(cost_gradient(theta, |x: &Theta| self.negated(x))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Sign conventions of the cost and both gradient branches.
    // -------------------------------------------------------------------------

    struct Quadratic;

    impl LogLikelihood for Quadratic {
        type Data = ();
        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-theta.dot(theta))
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    struct QuadraticWithGrad;

    impl LogLikelihood for QuadraticWithGrad {
        type Data = ();
        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-theta.dot(theta))
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok(theta.mapv(|x| -2.0 * x))
        }
    }

    #[test]
    // Purpose
    // -------
    // The cost is the negated log-likelihood.
    fn cost_is_negative_loglik() {
        let adapter = ArgMinAdapter::new(&Quadratic, &());
        let c = adapter.cost(&array![1.0, 2.0]).expect("finite cost");
        assert_eq!(c, 5.0);
    }

    #[test]
    fn non_finite_loglik_is_reported_as_error() {
        struct Cliff;
        impl LogLikelihood for Cliff {
            type Data = ();
            fn value(&self, _: &Theta, _: &()) -> OptResult<Cost> {
                Ok(f64::NEG_INFINITY)
            }
            fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
                Ok(())
            }
        }
        let err = ArgMinAdapter::new(&Cliff, &()).cost(&array![0.0]).expect_err("cliff");
        assert!(matches!(OptError::from(err), OptError::NonFiniteCost { .. }));
    }

    #[test]
    // Purpose
    // -------
    // FD and analytic branches agree on the cost gradient `2θ`.
    fn fd_and_analytic_gradients_agree() {
        let theta = array![0.5, -1.5];
        let fd = ArgMinAdapter::new(&Quadratic, &()).gradient(&theta).expect("fd gradient");
        let an = ArgMinAdapter::new(&QuadraticWithGrad, &())
            .gradient(&theta)
            .expect("analytic gradient");
        for i in 0..2 {
            assert_abs_diff_eq!(fd[i], 2.0 * theta[i], epsilon = 1e-5);
            assert_abs_diff_eq!(an[i], 2.0 * theta[i], epsilon = 1e-12);
        }
    }
}
