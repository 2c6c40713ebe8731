//! Content-addressed result cache
//!
//! Keys are SHA-256 digests of the fields that fully determine a
//! generation. Entries are written once and never changed afterwards.

pub mod file;
pub mod memory;
pub mod noop;

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use crate::backend::GenerationRequest;
use crate::config::{CacheConfig, CacheKind};
use crate::error::Result;
use crate::response::PortraitResult;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use noop::NoOpCache;

/// Fixed-length fingerprint of a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; 32]);

/// Canonical form hashed into a key. Field order is part of the format.
#[derive(Serialize)]
struct KeyFields<'a> {
    model_id: &'a str,
    negative: &'a str,
    prompt: &'a str,
    seed: u64,
    size: u32,
}

impl CacheKey {
    pub fn compute(prompt: &str, negative: &str, model_id: &str, size: u32, seed: u64) -> Self {
        let fields = KeyFields {
            model_id,
            negative,
            prompt,
            seed,
            size,
        };
        // Serializing plain strings and integers cannot fail
        let canonical = serde_json::to_vec(&fields).unwrap_or_default();
        let digest = Sha256::digest(&canonical);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn for_request(request: &GenerationRequest) -> Self {
        Self::compute(
            &request.prompt,
            &request.negative,
            &request.model_id,
            request.size,
            request.seed,
        )
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Storage strategy shared by the memory, file and no-op caches
#[async_trait]
pub trait ResultCache: Send + Sync {
    fn name(&self) -> &str;

    /// Stored result for `key`, or `None` on a miss.
    ///
    /// Unreadable entries count as misses.
    async fn get(&self, key: &CacheKey) -> Option<PortraitResult>;

    /// Store `result` under `key`. Failures are reported as `AppError::Cache`
    /// and callers treat them as non-fatal.
    async fn put(&self, key: &CacheKey, result: &PortraitResult) -> Result<()>;
}

/// Build the cache selected in configuration
pub fn from_config(config: &CacheConfig) -> Arc<dyn ResultCache> {
    match config.kind {
        CacheKind::Memory => Arc::new(MemoryCache::new()),
        CacheKind::File => Arc::new(FileCache::new(&config.dir)),
        CacheKind::Disabled => Arc::new(NoOpCache),
    }
}
