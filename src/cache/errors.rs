//! Errors raised by sample caches.
//!
//! Callers treat every [`CacheError`] on lookup as a miss; the variants
//! exist so the reason can be logged and surfaced when computing is not
//! allowed.

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheError {
    // ---- Storage ----
    /// Reading or writing the backing store failed.
    Io { path: String, reason: String },

    /// The stored artifact could not be (de)serialized.
    Serialization { reason: String },

    // ---- Content ----
    /// The artifact was written under a different parameter ordering.
    OrderMismatch { expected_version: u32, found_version: u32 },

    /// The artifact's shapes are inconsistent.
    Corrupt { reason: String },
}

impl std::error::Error for CacheError {}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Storage ----
            CacheError::Io { path, reason } => write!(f, "Cache I/O error at {path}: {reason}"),
            CacheError::Serialization { reason } => {
                write!(f, "Cache serialization error: {reason}")
            }

            // ---- Content ----
            CacheError::OrderMismatch { expected_version, found_version } => write!(
                f,
                "Cached parameter order mismatch (expected version {expected_version}, found {found_version})"
            ),
            CacheError::Corrupt { reason } => write!(f, "Corrupt cache artifact: {reason}"),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization { reason: err.to_string() }
    }
}
