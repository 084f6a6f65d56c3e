//! Per-strategy failure reasons.
//!
//! A [`StrategyError`] is recorded in the strategy's
//! [`StrategyStatus::Failed`](crate::estimation::traits::StrategyStatus)
//! slot and never aborts the model: the other strategies keep running and
//! the report leaves this strategy's cells empty.
use crate::cache::errors::CacheError;
use crate::inference::errors::InferenceError;
use crate::optimization::errors::OptError;
use crate::window::errors::ModelError;

pub type StrategyResult<T> = Result<T, StrategyError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyError {
    // ---- Fitting ----
    /// An optimizer or sampler stopped without a usable result.
    NonConvergence { reason: String },

    /// The regression design for a series is rank deficient.
    SingularDesign { series: &'static str },

    /// Too few rows to estimate the regression.
    InsufficientData { series: &'static str, rows: usize, params: usize },

    /// Every bootstrap replicate failed.
    NoSuccessfulReplicates { attempted: usize },

    // ---- Dependencies ----
    /// A strategy needs output that no earlier step produced.
    MissingDependency { what: &'static str },

    /// Cached samples were unavailable and computing them is not allowed.
    CacheUnavailable { reason: String },

    // ---- Passthrough ----
    Optimization(OptError),
    Inference(InferenceError),
    Model(ModelError),
    Cache(CacheError),
}

impl std::error::Error for StrategyError {}

impl std::fmt::Display for StrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Fitting ----
            StrategyError::NonConvergence { reason } => write!(f, "Did not converge: {reason}"),
            StrategyError::SingularDesign { series } => {
                write!(f, "Regression design for {series} is singular")
            }
            StrategyError::InsufficientData { series, rows, params } => write!(
                f,
                "Regression for {series} has {rows} rows for {params} coefficients"
            ),
            StrategyError::NoSuccessfulReplicates { attempted } => {
                write!(f, "All {attempted} bootstrap replicates failed")
            }

            // ---- Dependencies ----
            StrategyError::MissingDependency { what } => write!(f, "Missing dependency: {what}"),
            StrategyError::CacheUnavailable { reason } => {
                write!(f, "Cached samples unavailable: {reason}")
            }

            // ---- Passthrough ----
            StrategyError::Optimization(e) => write!(f, "Optimization error: {e}"),
            StrategyError::Inference(e) => write!(f, "{e}"),
            StrategyError::Model(e) => write!(f, "Model error: {e}"),
            StrategyError::Cache(e) => write!(f, "Cache error: {e}"),
        }
    }
}

impl From<OptError> for StrategyError {
    fn from(err: OptError) -> Self {
        StrategyError::Optimization(err)
    }
}

impl From<InferenceError> for StrategyError {
    fn from(err: InferenceError) -> Self {
        StrategyError::Inference(err)
    }
}

impl From<ModelError> for StrategyError {
    fn from(err: ModelError) -> Self {
        StrategyError::Model(err)
    }
}

impl From<CacheError> for StrategyError {
    fn from(err: CacheError) -> Self {
        StrategyError::Cache(err)
    }
}
