//! Unified error handling for inference routines.
//!
//! `InferenceError` covers the failures of the covariance and
//! multivariate-normal helpers: shape mismatches between vectors and
//! matrices, too few samples to estimate a covariance, unknown names during
//! reordering, and non-finite inputs. An alias `InferenceResult<T>`
//! standardizes the return type across inference code.

/// Unified error type for inference routines.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Shapes ----
    /// Vector/matrix dimensions disagree.
    DimensionMismatch { expected: usize, found: usize },

    /// A covariance matrix is not square.
    NonSquareMatrix { rows: usize, cols: usize },

    // ---- Samples ----
    /// Not enough samples to estimate a covariance.
    TooFewSamples { needed: usize, found: usize },

    /// A sample, mean, or covariance entry is NaN/±inf.
    NonFiniteValue { index: usize, value: f64 },

    // ---- Reordering ----
    /// A target name does not exist in the source ordering.
    UnknownName { name: String },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            InferenceError::DimensionMismatch { expected, found } => write!(
                f,
                "Inference Error: Dimension mismatch (expected {}, found {})",
                expected, found
            ),
            InferenceError::NonSquareMatrix { rows, cols } => {
                write!(f, "Inference Error: Covariance matrix is {}x{}, not square", rows, cols)
            }

            // ---- Samples ----
            InferenceError::TooFewSamples { needed, found } => write!(
                f,
                "Inference Error: Need at least {} samples, found {}",
                needed, found
            ),
            InferenceError::NonFiniteValue { index, value } => {
                write!(f, "Inference Error: Non-finite value {} at index {}", value, index)
            }

            // ---- Reordering ----
            InferenceError::UnknownName { name } => {
                write!(f, "Inference Error: Name '{}' not found in source ordering", name)
            }
        }
    }
}
