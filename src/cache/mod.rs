//! cache — persisted posterior samples.
//!
//! Purpose
//! -------
//! Expensive samplers persist their draws so a later run over the same data
//! and configuration can reload them instead of recomputing.
//!
//! Key behaviors
//! -------------
//! - [`SampleCache`] is the explicit `get`/`put` interface strategies use.
//! - [`CacheKey`] identifies an artifact by region, model configuration
//!   label, last observed date, and strategy.
//! - [`CachedSamples`] is the stored bundle: ordering version, parameter
//!   names, samples, and log-probabilities.
//! - [`JsonFileCache`] stores one JSON file per key; [`InMemoryCache`] keeps
//!   artifacts for the lifetime of the process.
//!
//! Invariants & assumptions
//! ------------------------
//! - Read-then-write, last writer wins. Valid only when a single process
//!   runs the batch; concurrent writers may interleave.
//! - An artifact whose names or ordering version differ from the model's
//!   ordering is rejected with [`CacheError::OrderMismatch`] and treated as
//!   a miss.
//! - `serde_json` is built with `float_roundtrip`, so reloaded samples are
//!   bit-identical to the stored ones.
pub mod errors;
pub mod json_file;
pub mod memory;

pub use self::errors::{CacheError, CacheResult};
pub use self::json_file::JsonFileCache;
pub use self::memory::InMemoryCache;

use crate::window::core::params::{ParamOrder, ParamVector};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Explicit cache interface. `get` returns `Ok(None)` on a clean miss.
pub trait SampleCache {
    fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedSamples>>;
    fn put(&self, key: &CacheKey, samples: &CachedSamples) -> CacheResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub region: String,
    pub model_type: String,
    pub last_date: NaiveDate,
    pub strategy: String,
}

impl CacheKey {
    pub fn new(
        region: impl Into<String>, model_type: impl Into<String>, last_date: NaiveDate,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            model_type: model_type.into(),
            last_date,
            strategy: strategy.into(),
        }
    }

    /// Filesystem-safe stem `{region}_{model_type}_{date}_{strategy}`.
    pub fn file_stem(&self) -> String {
        let raw = format!(
            "{}_{}_{}_{}",
            self.region,
            self.model_type,
            self.last_date.format("%Y-%m-%d"),
            self.strategy
        );
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}/{}", self.region, self.model_type, self.last_date, self.strategy)
    }
}

/// Stored sample bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSamples {
    pub order_version: u32,
    pub param_names: Vec<String>,
    pub samples: Vec<Vec<f64>>,
    pub log_probs: Vec<f64>,
}

impl CachedSamples {
    pub fn from_samples(order: &ParamOrder, samples: &[ParamVector], log_probs: &[f64]) -> Self {
        Self {
            order_version: order.version(),
            param_names: order.names().to_vec(),
            samples: samples.iter().map(ParamVector::to_vec).collect(),
            log_probs: log_probs.to_vec(),
        }
    }

    /// Check the bundle against `order` and unpack it.
    ///
    /// # Errors
    /// - `OrderMismatch` when the version or names differ.
    /// - `Corrupt` when sample lengths or the log-prob count disagree.
    pub fn into_samples(self, order: &ParamOrder) -> CacheResult<(Vec<ParamVector>, Vec<f64>)> {
        if self.order_version != order.version() || self.param_names != order.names() {
            return Err(CacheError::OrderMismatch {
                expected_version: order.version(),
                found_version: self.order_version,
            });
        }
        if self.samples.len() != self.log_probs.len() {
            return Err(CacheError::Corrupt {
                reason: format!(
                    "{} samples but {} log-probs",
                    self.samples.len(),
                    self.log_probs.len()
                ),
            });
        }
        if let Some(bad) = self.samples.iter().find(|s| s.len() != order.len()) {
            return Err(CacheError::Corrupt {
                reason: format!("sample of length {} for {} parameters", bad.len(), order.len()),
            });
        }
        let samples = self.samples.into_iter().map(ParamVector::from).collect();
        Ok((samples, self.log_probs))
    }
}
