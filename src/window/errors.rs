//! Errors for the moving-window model (data validation, configuration, and
//! fit lifecycle).
//!
//! [`ModelError`] is fatal for the region it was raised for: a pipeline run
//! records it against the region and moves on. Numerical failures inside a
//! strategy never surface here; they stay inside the strategy's own status.
//!
//! ## Conventions
//! - **Indices are 0-based** series offsets from the region's first date.
//! - `series` fields carry the series label (`"positive"` / `"deceased"`).
use crate::optimization::errors::OptError;

/// Result alias for model construction and lifecycle operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Input/data validation ----
    /// Series has no observations.
    EmptySeries,

    /// Case and death series must have the same length.
    SeriesLengthMismatch { positive: usize, deceased: usize },

    /// A count is NaN/±inf.
    NonFiniteCount { series: &'static str, index: usize, value: f64 },

    /// A count is negative.
    NegativeCount { series: &'static str, index: usize, value: f64 },

    /// Threshold index lies beyond the end of the series.
    ThresholdOutOfRange { series: &'static str, index: usize, len: usize },

    /// Population must be finite and > 0.
    InvalidPopulation { value: f64 },

    /// No observation falls inside the moving window.
    EmptyWindow { series: &'static str },

    // ---- Configuration ----
    /// A parameter name appears twice in an ordering.
    DuplicateParamName { name: String },

    /// A name required by the simulation or likelihood is not in the ordering.
    MissingParam { name: String },

    /// A logarithmic parameter name is not part of the ordering.
    UnknownLogParam { name: String },

    /// A parameter vector does not match the ordering it is decoded with.
    ParamLengthMismatch { expected: usize, actual: usize },

    /// A model option is out of range.
    InvalidOption { name: &'static str, reason: &'static str },

    /// A prior could not be constructed.
    InvalidPrior { name: String, reason: String },

    // ---- Fit lifecycle ----
    /// A full fit was requested on a model that has already been fitted.
    AlreadyFitted { state: &'static str },

    /// The same strategy was attempted twice on one model.
    StrategyAlreadyAttempted { strategy: &'static str },

    /// Reporting was requested before any fit ran.
    NotFitted,

    // ---- Optimizer passthrough ----
    Optimization(OptError),
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            ModelError::EmptySeries => write!(f, "Series is empty"),
            ModelError::SeriesLengthMismatch { positive, deceased } => write!(
                f,
                "Series length mismatch: {positive} case observations vs {deceased} death observations"
            ),
            ModelError::NonFiniteCount { series, index, value } => {
                write!(f, "Non-finite {series} count at index {index}: {value}")
            }
            ModelError::NegativeCount { series, index, value } => {
                write!(f, "Negative {series} count at index {index}: {value}")
            }
            ModelError::ThresholdOutOfRange { series, index, len } => {
                write!(f, "{series} threshold index {index} is beyond series length {len}")
            }
            ModelError::InvalidPopulation { value } => {
                write!(f, "Invalid population {value}: must be finite and > 0")
            }
            ModelError::EmptyWindow { series } => {
                write!(f, "Moving window for {series} contains no observations")
            }

            // ---- Configuration ----
            ModelError::DuplicateParamName { name } => {
                write!(f, "Duplicate parameter name '{name}'")
            }
            ModelError::MissingParam { name } => {
                write!(f, "Required parameter '{name}' is missing from the ordering")
            }
            ModelError::UnknownLogParam { name } => {
                write!(f, "Logarithmic parameter '{name}' is not in the ordering")
            }
            ModelError::ParamLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, actual {actual}")
            }
            ModelError::InvalidOption { name, reason } => {
                write!(f, "Invalid option '{name}': {reason}")
            }
            ModelError::InvalidPrior { name, reason } => {
                write!(f, "Invalid prior for '{name}': {reason}")
            }

            // ---- Fit lifecycle ----
            ModelError::AlreadyFitted { state } => {
                write!(f, "Model already fitted (state: {state})")
            }
            ModelError::StrategyAlreadyAttempted { strategy } => {
                write!(f, "Strategy '{strategy}' was already attempted on this model")
            }
            ModelError::NotFitted => write!(f, "Model has not been fitted"),

            // ---- Optimizer passthrough ----
            ModelError::Optimization(err) => write!(f, "Optimization error: {err}"),
        }
    }
}

impl From<OptError> for ModelError {
    fn from(err: OptError) -> Self {
        ModelError::Optimization(err)
    }
}
