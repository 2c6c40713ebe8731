//! Pass-through cache used when caching is disabled

use async_trait::async_trait;

use crate::cache::{CacheKey, ResultCache};
use crate::error::Result;
use crate::response::PortraitResult;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCache;

#[async_trait]
impl ResultCache for NoOpCache {
    fn name(&self) -> &str {
        "none"
    }

    async fn get(&self, _key: &CacheKey) -> Option<PortraitResult> {
        None
    }

    async fn put(&self, _key: &CacheKey, _result: &PortraitResult) -> Result<()> {
        Ok(())
    }
}
