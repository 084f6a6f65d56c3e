//! Process-lifetime [`SampleCache`] backed by a map.
use crate::cache::{CacheKey, CachedSamples, SampleCache, errors::CacheResult};
use std::{cell::RefCell, collections::BTreeMap};
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RefCell<BTreeMap<CacheKey, CachedSamples>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SampleCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedSamples>> {
        let hit = self.entries.borrow().get(key).cloned();
        debug!(key = %key, hit = hit.is_some(), "cache.lookup");
        Ok(hit)
    }

    fn put(&self, key: &CacheKey, samples: &CachedSamples) -> CacheResult<()> {
        self.entries.borrow_mut().insert(key.clone(), samples.clone());
        Ok(())
    }
}
