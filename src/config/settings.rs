//! Portrait job settings and configuration management

use crate::backend::resolve_model_id;
use crate::error::{AppError, Result};
use crate::specs::{ensure_unique_names, CharacterSpec, VariantSpec, WorldSpec};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub world: WorldSpec,
    #[serde(default)]
    pub characters: Vec<CharacterSpec>,
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Shortname (`titan`, `sdxl`, `sd35`) or full model id
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_endpoint_url: Option<String>,
    /// Deadline forwarded to the transport; none by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_model() -> String {
    "titan".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            model: default_model(),
            endpoint_url: None,
            control_endpoint_url: None,
            timeout_ms: None,
        }
    }
}

/// Cache backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Memory,
    #[default]
    File,
    #[serde(rename = "none", alias = "disabled")]
    Disabled,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub kind: CacheKind,
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

fn default_cache_dir() -> String {
    ".facegen_cache".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: CacheKind::default(),
            dir: default_cache_dir(),
        }
    }
}

/// Generation options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Images per variant
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_concurrency")]
    pub max_concurrent_variants: usize,
}

fn default_count() -> u32 {
    1
}

fn default_concurrency() -> usize {
    1
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            count: default_count(),
            max_concurrent_variants: default_concurrency(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from a configuration file (JSON, TOML or YAML by
    /// extension), overridden by `FACEGEN__SECTION__KEY` variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(true))
            .add_source(
                Environment::with_prefix("FACEGEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Full model id for the configured model
    pub fn model_id(&self) -> Result<String> {
        resolve_model_id(&self.backend.model)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.characters.is_empty() {
            return Err(AppError::Validation("no characters specified".to_string()));
        }
        if self.variants.is_empty() {
            return Err(AppError::Validation("no variants specified".to_string()));
        }
        if self.generation.count == 0 {
            return Err(AppError::Validation(
                "generation.count must be at least 1".to_string(),
            ));
        }
        if self.generation.max_concurrent_variants == 0 {
            return Err(AppError::Validation(
                "generation.max_concurrent_variants must be at least 1".to_string(),
            ));
        }
        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Validation(format!(
                "logging.format '{}' must be 'json' or 'pretty'",
                self.logging.format
            )));
        }

        for character in &self.characters {
            character.validate()?;
        }
        for variant in &self.variants {
            variant.validate()?;
        }
        ensure_unique_names(&self.variants)?;
        self.model_id()?;

        Ok(())
    }

    /// Sample configuration emitted by `init-config`
    pub fn template() -> Self {
        Self {
            world: WorldSpec::new(
                "A fantasy medieval kingdom with magic and dragons.",
                "Painterly fantasy art, rich colors, dramatic lighting.",
                "text, watermark, blurry, modern elements",
            ),
            characters: vec![
                CharacterSpec::new(
                    "Elena Stormblade",
                    "Knight Captain",
                    "Stern woman in plate armor, silver hair, battle scars, determined expression.",
                ),
                CharacterSpec::new(
                    "Finn Quickfingers",
                    "Thief",
                    "Young man with mischievous grin, hooded cloak, daggers at belt.",
                ),
            ],
            variants: vec![
                VariantSpec::new(
                    "icon",
                    64,
                    "Small square icon, face closeup, bold silhouette, readable at tiny size.",
                ),
                VariantSpec::new(
                    "bust",
                    256,
                    "Portrait from shoulders up, neutral background, clear details.",
                ),
                VariantSpec::new(
                    "full",
                    1024,
                    "Full body portrait, character in environment, detailed.",
                ),
            ],
            ..Self::default()
        }
    }
}
