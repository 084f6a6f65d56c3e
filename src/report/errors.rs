//! Errors raised while building or writing reports.
use crate::window::errors::ModelError;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    // ---- Output ----
    Io { path: String, reason: String },
    Csv { reason: String },
    Json { reason: String },

    // ---- Content ----
    /// A prediction sample could not be simulated.
    Model(ModelError),
}

impl std::error::Error for ReportError {}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Output ----
            ReportError::Io { path, reason } => write!(f, "Failed to write {path}: {reason}"),
            ReportError::Csv { reason } => write!(f, "CSV error: {reason}"),
            ReportError::Json { reason } => write!(f, "JSON error: {reason}"),

            // ---- Content ----
            ReportError::Model(e) => write!(f, "Model error: {e}"),
        }
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Csv { reason: err.to_string() }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Json { reason: err.to_string() }
    }
}

impl From<ModelError> for ReportError {
    fn from(err: ModelError) -> Self {
        ReportError::Model(err)
    }
}
