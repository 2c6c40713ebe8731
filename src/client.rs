//! Portrait client: runs the per-variant generation pipeline
//!
//! For every variant: compose prompt, resolve seed, fingerprint, consult
//! the cache, and on a miss encode, invoke, decode, normalize and store.
//! Variants are independent; one failing never cancels another.

use futures::future::join_all;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::backend::{GenerationRequest, ImageInvoker, ImageModel, ModelAdapter};
use crate::cache::{CacheKey, NoOpCache, ResultCache};
use crate::error::{AppError, Result};
use crate::prompt;
use crate::queue::KeyedLocks;
use crate::response::{ImageProcessor, PortraitResult};
use crate::specs::{ensure_unique_names, CharacterSpec, VariantSpec, WorldSpec};

/// Source of seeds when the caller does not supply one
pub trait SeedSource: Send + Sync {
    /// A seed in `0..=upper_bound`
    fn next_seed(&self, upper_bound: u64) -> u64;
}

/// Uniform draw from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSeed;

impl SeedSource for RandomSeed {
    fn next_seed(&self, upper_bound: u64) -> u64 {
        rand::thread_rng().gen_range(0..=upper_bound)
    }
}

/// Per-call generation options
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Fixed seed; reused verbatim for the first image of each variant
    pub seed: Option<u64>,
    /// Images per variant
    pub count: u32,
    /// Deadline forwarded to the invoker
    pub deadline: Option<Duration>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            count: 1,
            deadline: None,
        }
    }
}

impl GenerateOptions {
    pub fn with_seed(seed: Option<u64>) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Outcome of one variant: its result or the error scoped to it
pub type VariantOutcome = Result<PortraitResult>;

pub struct PortraitClient {
    invoker: Arc<dyn ImageInvoker>,
    cache: Arc<dyn ResultCache>,
    seeds: Arc<dyn SeedSource>,
    processor: ImageProcessor,
    locks: KeyedLocks<CacheKey>,
    max_concurrent: usize,
}

impl PortraitClient {
    /// Client without caching, random seeds and sequential variants
    pub fn new(invoker: Arc<dyn ImageInvoker>) -> Self {
        Self {
            invoker,
            cache: Arc::new(NoOpCache),
            seeds: Arc::new(RandomSeed),
            processor: ImageProcessor::new(),
            locks: KeyedLocks::new(),
            max_concurrent: 1,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Number of variants allowed in flight at once (minimum 1)
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn cache_name(&self) -> &str {
        self.cache.name()
    }

    /// Generate one image per variant.
    ///
    /// The outer error only covers request-level problems (duplicate
    /// variant names); everything else is reported per variant.
    pub async fn generate(
        &self,
        world: &WorldSpec,
        character: &CharacterSpec,
        variants: &[VariantSpec],
        model_id: &str,
        seed: Option<u64>,
    ) -> Result<BTreeMap<String, VariantOutcome>> {
        let outcomes = self
            .generate_many(
                world,
                character,
                variants,
                model_id,
                &GenerateOptions::with_seed(seed),
            )
            .await?;

        Ok(outcomes
            .into_iter()
            .map(|(name, results)| {
                let outcome = results.into_iter().next().unwrap_or_else(|| {
                    Err(AppError::Backend("no result produced".to_string()))
                });
                (name, outcome)
            })
            .collect())
    }

    /// Generate `options.count` images per variant.
    ///
    /// A variant that fails before any image is attempted (invalid spec,
    /// bad seed) reports a single error instead of `count` entries.
    pub async fn generate_many(
        &self,
        world: &WorldSpec,
        character: &CharacterSpec,
        variants: &[VariantSpec],
        model_id: &str,
        options: &GenerateOptions,
    ) -> Result<BTreeMap<String, Vec<VariantOutcome>>> {
        ensure_unique_names(variants)?;
        if options.count == 0 {
            return Err(AppError::Validation("count must be at least 1".to_string()));
        }

        let adapter = ModelAdapter::for_model(model_id);
        let semaphore = Semaphore::new(self.max_concurrent);

        debug!(
            character = %character.name,
            variants = variants.len(),
            model_id = %model_id,
            adapter = adapter.family(),
            "Generating portraits"
        );

        let pipelines = variants.iter().map(|variant| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.ok();
                let results = self
                    .run_variant(world, character, variant, model_id, adapter, options)
                    .await;
                (variant.name.clone(), results)
            }
        });

        Ok(join_all(pipelines).await.into_iter().collect())
    }

    async fn run_variant(
        &self,
        world: &WorldSpec,
        character: &CharacterSpec,
        variant: &VariantSpec,
        model_id: &str,
        adapter: ModelAdapter,
        options: &GenerateOptions,
    ) -> Vec<VariantOutcome> {
        let composed = match variant
            .validate()
            .and_then(|_| prompt::compose(world, character, variant))
        {
            Ok(composed) => composed,
            Err(e) => {
                log_failure(&variant.name, &e);
                return vec![Err(e)];
            }
        };

        let upper = adapter.seed_upper_bound();
        if let Some(seed) = options.seed.filter(|seed| *seed > upper) {
            let e = AppError::Validation(format!(
                "seed {} exceeds {} maximum {}",
                seed,
                adapter.family(),
                upper
            ));
            log_failure(&variant.name, &e);
            return vec![Err(e)];
        }

        let mut results = Vec::with_capacity(options.count as usize);
        for index in 0..options.count {
            let seed = match options.seed {
                Some(seed) => offset_seed(seed, index, upper),
                None => self.seeds.next_seed(upper),
            };
            let request = GenerationRequest {
                prompt: composed.prompt.clone(),
                negative: composed.negative.clone(),
                model_id: model_id.to_string(),
                size: variant.size,
                seed,
            };

            let outcome = self
                .run_image(&variant.name, &request, adapter, options.deadline)
                .await;
            if let Err(e) = &outcome {
                log_failure(&variant.name, e);
            }
            results.push(outcome);
        }
        results
    }

    /// One image: cache lookup, then the remote pipeline on a miss.
    ///
    /// Runs under the key's lock so at most one remote call per key is in
    /// flight; a waiter for the same key sees the stored entry afterwards.
    async fn run_image(
        &self,
        variant_name: &str,
        request: &GenerationRequest,
        adapter: ModelAdapter,
        deadline: Option<Duration>,
    ) -> VariantOutcome {
        let key = CacheKey::for_request(request);
        let _guard = self.locks.lock(key).await;

        if let Some(stored) = self.cache.get(&key).await {
            info!(variant = %variant_name, cache_key = %key, "Cache hit");
            return Ok(stored.from_cache(variant_name));
        }

        let body = adapter.encode(
            &request.prompt,
            &request.negative,
            self.processor.canonical_size(),
            request.seed,
        )?;

        debug!(
            variant = %variant_name,
            cache_key = %key,
            seed = request.seed,
            invoker = self.invoker.name(),
            "Cache miss, invoking backend"
        );
        let response = self
            .invoker
            .invoke(&request.model_id, &body, deadline)
            .await?;

        let decoded = adapter.decode(&response)?;
        let image = self.processor.normalize(&decoded.bytes, request.size)?;

        let result = PortraitResult {
            variant_name: variant_name.to_string(),
            width: image.width,
            height: image.height,
            image_bytes: image.bytes,
            model_id: request.model_id.clone(),
            seed_used: decoded.seed.unwrap_or(request.seed),
            cache_hit: false,
        };

        if let Err(e) = self.cache.put(&key, &result).await {
            warn!(
                variant = %variant_name,
                cache = self.cache.name(),
                cache_key = %key,
                error = %e,
                "Failed to store result, continuing without caching"
            );
        }

        info!(
            variant = %variant_name,
            width = result.width,
            seed = result.seed_used,
            "Generated portrait"
        );
        Ok(result)
    }
}

/// `seed + index`, wrapped into the adapter's seed range
fn offset_seed(seed: u64, index: u32, upper_bound: u64) -> u64 {
    let span = upper_bound as u128 + 1;
    ((seed as u128 + index as u128) % span) as u64
}

fn log_failure(variant: &str, error: &AppError) {
    warn!(
        variant = %variant,
        error_type = error.error_type(),
        error = %error,
        "Variant failed"
    );
}
