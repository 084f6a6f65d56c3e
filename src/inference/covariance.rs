//! inference::covariance — sample moments and name-based reordering.
//!
//! Purpose
//! -------
//! Small linear-algebra helpers shared by the estimation strategies:
//! - [`sample_moments`]: mean and unbiased covariance of a set of vectors.
//! - [`permute_to_order`]: rearrange a mean/covariance pair produced in one
//!   name ordering (e.g. a regression design's columns) into another.
//!
//! Invariants & assumptions
//! ------------------------
//! - Covariances use the `n - 1` denominator.
//! - Reordering is a pure gather: `out[i][j] = src[p(i)][p(j)]` where
//!   `p(i)` is the source position of the i-th target name.
use crate::inference::errors::{InferenceError, InferenceResult};
use ndarray::{Array1, Array2};

/// Sample mean and unbiased covariance of `samples`.
///
/// # Errors
/// - `TooFewSamples` with fewer than two samples.
/// - `DimensionMismatch` when sample lengths differ.
/// - `NonFiniteValue` when an entry is NaN/±inf.
pub fn sample_moments(samples: &[Array1<f64>]) -> InferenceResult<(Array1<f64>, Array2<f64>)> {
    if samples.len() < 2 {
        return Err(InferenceError::TooFewSamples { needed: 2, found: samples.len() });
    }
    let dim = samples[0].len();
    let mut mean = Array1::<f64>::zeros(dim);
    for sample in samples {
        if sample.len() != dim {
            return Err(InferenceError::DimensionMismatch { expected: dim, found: sample.len() });
        }
        if let Some((index, &value)) = sample.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(InferenceError::NonFiniteValue { index, value });
        }
        mean += sample;
    }
    let n = samples.len() as f64;
    mean /= n;

    let mut cov = Array2::<f64>::zeros((dim, dim));
    for sample in samples {
        let d = sample - &mean;
        for i in 0..dim {
            for j in 0..dim {
                cov[[i, j]] += d[i] * d[j];
            }
        }
    }
    cov /= n - 1.0;
    Ok((mean, cov))
}

/// Rearrange `mean`/`cov`, laid out by `source_names`, into `target_names`
/// order. Every target name must appear in the source; source names that the
/// target omits are dropped.
///
/// # Errors
/// - `DimensionMismatch` when `mean`/`cov` disagree with `source_names`.
/// - `UnknownName` for a target name absent from the source.
pub fn permute_to_order<S: AsRef<str>, T: AsRef<str>>(
    mean: &Array1<f64>, cov: &Array2<f64>, source_names: &[S], target_names: &[T],
) -> InferenceResult<(Array1<f64>, Array2<f64>)> {
    let n = source_names.len();
    if mean.len() != n {
        return Err(InferenceError::DimensionMismatch { expected: n, found: mean.len() });
    }
    if cov.nrows() != n || cov.ncols() != n {
        return Err(InferenceError::DimensionMismatch { expected: n, found: cov.nrows() });
    }

    let mapping = target_names
        .iter()
        .map(|target| {
            source_names.iter().position(|s| s.as_ref() == target.as_ref()).ok_or_else(|| {
                InferenceError::UnknownName { name: target.as_ref().to_string() }
            })
        })
        .collect::<InferenceResult<Vec<usize>>>()?;

    let m = mapping.len();
    let out_mean = Array1::from_shape_fn(m, |i| mean[mapping[i]]);
    let out_cov = Array2::from_shape_fn((m, m), |(i, j)| cov[[mapping[i], mapping[j]]]);
    Ok((out_mean, out_cov))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Sample moments on a tiny hand-checked set, the degenerate-input errors,
    // and reordering of a 3×3 covariance by name.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Mean and n-1 covariance match a hand computation.
    //
    // Given
    // -----
    // - Samples (0, 0), (2, 2), (4, -2).
    //
    // Expect
    // ------
    // - mean = (2, 0); var_x = 4, var_y = 4, cov_xy = -2.
    fn sample_moments_match_hand_computation() {
        // Arrange
        let samples = vec![array![0.0, 0.0], array![2.0, 2.0], array![4.0, -2.0]];

        // Act
        let (mean, cov) = sample_moments(&samples).expect("moments");

        // Assert
        assert_relative_eq!(mean[0], 2.0);
        assert_relative_eq!(mean[1], 0.0);
        assert_relative_eq!(cov[[0, 0]], 4.0);
        assert_relative_eq!(cov[[1, 1]], 4.0);
        assert_relative_eq!(cov[[0, 1]], -2.0);
        assert_relative_eq!(cov[[1, 0]], -2.0);
    }

    #[test]
    fn sample_moments_reject_single_sample() {
        let err = sample_moments(&[array![1.0]]).expect_err("one sample");
        assert_eq!(err, InferenceError::TooFewSamples { needed: 2, found: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Reordering gathers mean entries and both covariance axes by name.
    //
    // Given
    // -----
    // - Source order (c, a, b), mean (3, 1, 2), cov[i][j] = 10·i + j.
    //
    // Expect
    // ------
    // - Target order (a, b, c) gives mean (1, 2, 3) and
    //   cov_out[i][j] = cov[p(i)][p(j)] with p = (1, 2, 0).
    fn permute_to_order_gathers_rows_and_columns() {
        // Arrange
        let mean = array![3.0, 1.0, 2.0];
        let cov = Array2::from_shape_fn((3, 3), |(i, j)| (10 * i + j) as f64);

        // Act
        let (m, c) = permute_to_order(&mean, &cov, &["c", "a", "b"], &["a", "b", "c"])
            .expect("permutation");

        // Assert
        assert_eq!(m, array![1.0, 2.0, 3.0]);
        let p = [1usize, 2, 0];
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(c[[i, j]], cov[[p[i], p[j]]]);
            }
        }
    }

    #[test]
    fn permute_to_order_rejects_unknown_target() {
        let mean = array![1.0];
        let cov = array![[1.0]];
        let err = permute_to_order(&mean, &cov, &["a"], &["z"]).expect_err("unknown");
        assert_eq!(err, InferenceError::UnknownName { name: "z".to_string() });
    }
}
