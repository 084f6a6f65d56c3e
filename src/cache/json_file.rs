//! One JSON file per cache key under a directory.
use crate::cache::{
    CacheKey, CachedSamples, SampleCache,
    errors::{CacheError, CacheResult},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// File-backed [`SampleCache`]. Files are `{dir}/{key.file_stem()}.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }
}

impl SampleCache for JsonFileCache {
    fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedSamples>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, path = %path.display(), "cache.miss");
                return Ok(None);
            }
            Err(e) => {
                warn!(key = %key, path = %path.display(), error = %e, "cache.read_failed");
                return Err(io_error(&path, e));
            }
        };
        match serde_json::from_slice::<CachedSamples>(&bytes) {
            Ok(samples) => {
                info!(key = %key, n_samples = samples.samples.len(), "cache.hit");
                Ok(Some(samples))
            }
            Err(e) => {
                warn!(key = %key, path = %path.display(), error = %e, "cache.decode_failed");
                Err(e.into())
            }
        }
    }

    fn put(&self, key: &CacheKey, samples: &CachedSamples) -> CacheResult<()> {
        let path = self.path_for(key);
        let result = fs::create_dir_all(&self.dir)
            .map_err(|e| io_error(&self.dir, e))
            .and_then(|()| serde_json::to_vec(samples).map_err(CacheError::from))
            .and_then(|bytes| fs::write(&path, bytes).map_err(|e| io_error(&path, e)));
        match &result {
            Ok(()) => info!(key = %key, path = %path.display(), n_samples = samples.samples.len(), "cache.written"),
            Err(e) => warn!(key = %key, path = %path.display(), error = %e, "cache.write_failed"),
        }
        result
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::Io { path: path.display().to_string(), reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Miss on an empty directory, exact round trip through disk, and a
    // decode failure on a damaged file.
    // -------------------------------------------------------------------------

    fn key() -> CacheKey {
        CacheKey::new(
            "Ohio",
            "moving_window_14_days",
            NaiveDate::from_ymd_opt(2020, 6, 30).expect("date"),
            "PyMC3",
        )
    }

    #[test]
    fn get_on_empty_directory_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = JsonFileCache::new(dir.path());
        assert_eq!(cache.get(&key()), Ok(None));
    }

    #[test]
    // Purpose
    // -------
    // Stored samples come back bit-identical.
    //
    // Given
    // -----
    // - Floats chosen to stress decimal round-tripping (0.1 + 0.2, 1/3, tiny
    //   and huge magnitudes).
    //
    // Expect
    // ------
    // - `get` returns exactly what `put` stored.
    fn put_then_get_round_trips_exactly() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = JsonFileCache::new(dir.path().join("nested"));
        let stored = CachedSamples {
            order_version: 1,
            param_names: vec!["a".into(), "b".into()],
            samples: vec![vec![0.1 + 0.2, 1.0 / 3.0], vec![1e-300, 6.02214076e23]],
            log_probs: vec![-12.345678901234567, f64::MIN_POSITIVE],
        };

        // Act
        cache.put(&key(), &stored).expect("put");
        let loaded = cache.get(&key()).expect("get").expect("hit");

        // Assert
        assert_eq!(loaded, stored);
        for (a, b) in loaded.samples.iter().flatten().zip(stored.samples.iter().flatten()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn damaged_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = JsonFileCache::new(dir.path());
        fs::write(cache.path_for(&key()), b"{not json").expect("write");
        assert!(matches!(cache.get(&key()), Err(CacheError::Serialization { .. })));
    }
}
