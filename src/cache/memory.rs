//! Process-lifetime in-memory cache

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::cache::{CacheKey, ResultCache};
use crate::error::Result;
use crate::response::PortraitResult;

/// Unbounded map from key to result; lost on exit, never evicts
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, PortraitResult>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &CacheKey) -> Option<PortraitResult> {
        self.entries.read().get(key).cloned()
    }

    async fn put(&self, key: &CacheKey, result: &PortraitResult) -> Result<()> {
        // First write wins; keys are pure functions of their inputs
        self.entries.write().entry(*key).or_insert_with(|| PortraitResult {
            cache_hit: false,
            ..result.clone()
        });
        Ok(())
    }
}
