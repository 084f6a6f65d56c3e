//! inference::mvn — multivariate normal with a PSD square root.
//!
//! [`MultivariateNormal`] stores the mean, the (symmetrized) covariance, and
//! a square root `L = Q diag(√max(λ, 0))` taken from the symmetric
//! eigendecomposition. Draws are `μ + L z` with `z ~ N(0, I)`. Semi-definite
//! covariances are allowed: zero-variance coordinates are reproduced exactly.
use crate::inference::{
    covariance::sample_moments,
    errors::{InferenceError, InferenceResult},
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::StandardNormal;

#[derive(Debug, Clone, PartialEq)]
pub struct MultivariateNormal {
    mean: Array1<f64>,
    cov: Array2<f64>,
    sqrt: Array2<f64>,
}

impl MultivariateNormal {
    /// Validate shapes and finiteness, symmetrize `cov`, and factor it.
    ///
    /// # Errors
    /// - `NonSquareMatrix` / `DimensionMismatch` on shape problems.
    /// - `NonFiniteValue` on NaN/±inf in `mean` or `cov`.
    pub fn new(mean: Array1<f64>, cov: Array2<f64>) -> InferenceResult<Self> {
        if cov.nrows() != cov.ncols() {
            return Err(InferenceError::NonSquareMatrix { rows: cov.nrows(), cols: cov.ncols() });
        }
        let n = mean.len();
        if cov.nrows() != n {
            return Err(InferenceError::DimensionMismatch { expected: n, found: cov.nrows() });
        }
        for (index, &value) in mean.iter().chain(cov.iter()).enumerate() {
            if !value.is_finite() {
                return Err(InferenceError::NonFiniteValue { index, value });
            }
        }

        let sym = Array2::from_shape_fn((n, n), |(i, j)| 0.5 * (cov[[i, j]] + cov[[j, i]]));
        let nalg = DMatrix::from_fn(n, n, |i, j| sym[[i, j]]);
        let eigen = nalg.symmetric_eigen();
        let mut sqrt = Array2::<f64>::zeros((n, n));
        for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
            let scale = lambda.max(0.0).sqrt();
            for i in 0..n {
                sqrt[[i, k]] = eigen.eigenvectors[(i, k)] * scale;
            }
        }
        Ok(Self { mean, cov: sym, sqrt })
    }

    /// Fit mean and unbiased covariance to `samples`.
    pub fn fit_to_samples(samples: &[Array1<f64>]) -> InferenceResult<Self> {
        let (mean, cov) = sample_moments(samples)?;
        Self::new(mean, cov)
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn cov(&self) -> &Array2<f64> {
        &self.cov
    }

    /// `sqrt(diag(cov))`.
    pub fn std_errors(&self) -> Array1<f64> {
        self.cov.diag().mapv(|v| v.max(0.0).sqrt())
    }

    /// One draw `μ + L z`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<f64> {
        let z = Array1::from_shape_fn(self.dim(), |_| rng.sample::<f64, _>(StandardNormal));
        &self.mean + &self.sqrt.dot(&z)
    }

    /// `n` independent draws.
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<Array1<f64>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}
