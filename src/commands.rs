//! Command implementations behind the `facegen` binary
//!
//! The binary parses arguments and prints; everything with a policy
//! (file naming, exit codes, template output) lives here.

use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::info;

use crate::backend::{BedrockInvoker, ImageInvoker};
use crate::cache::{self, FileCache};
use crate::client::{GenerateOptions, PortraitClient};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::response::file::OutputWriter;
use crate::specs::CharacterSpec;

/// Output format for `init-config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TemplateFormat {
    #[default]
    Json,
    Toml,
    Yaml,
}

/// Render the sample configuration
pub fn init_config(format: TemplateFormat) -> Result<String> {
    let template = Settings::template();
    let rendered = match format {
        TemplateFormat::Json => serde_json::to_string_pretty(&template)?,
        TemplateFormat::Toml => toml::to_string_pretty(&template).map_err(template_error)?,
        TemplateFormat::Yaml => serde_yaml::to_string(&template).map_err(template_error)?,
    };
    Ok(rendered)
}

fn template_error(e: impl fmt::Display) -> AppError {
    AppError::Config(config::ConfigError::Message(format!(
        "failed to render template: {}",
        e
    )))
}

/// Load extra characters from a JSON file or a directory of JSON files
pub async fn load_characters(path: &Path) -> Result<Vec<CharacterSpec>> {
    let metadata = fs::metadata(path).await?;
    if metadata.is_file() {
        return Ok(vec![read_character(path).await?]);
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file = entry.path();
        if file.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(file);
        }
    }
    files.sort();

    let mut characters = Vec::with_capacity(files.len());
    for file in files {
        characters.push(read_character(&file).await?);
    }
    Ok(characters)
}

async fn read_character(path: &Path) -> Result<CharacterSpec> {
    let data = fs::read(path).await?;
    let character: CharacterSpec = serde_json::from_slice(&data)?;
    character.validate()?;
    Ok(character)
}

/// Build a portrait client from settings around the given invoker
pub fn build_client(settings: &Settings, invoker: Arc<dyn ImageInvoker>) -> PortraitClient {
    PortraitClient::new(invoker)
        .with_cache(cache::from_config(&settings.cache))
        .with_max_concurrent(settings.generation.max_concurrent_variants)
}

/// Per-image line of a generate run
#[derive(Debug)]
pub struct StatusLine {
    pub character: String,
    pub variant: String,
    pub outcome: std::result::Result<WrittenImage, AppError>,
}

#[derive(Debug, Clone)]
pub struct WrittenImage {
    pub path: PathBuf,
    pub cache_hit: bool,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(written) => write!(
                f,
                "ok    {}/{} -> {}{}",
                self.character,
                self.variant,
                written.path.display(),
                if written.cache_hit { " (cached)" } else { "" }
            ),
            Err(e) => write!(
                f,
                "error {}/{}: [{}] {}",
                self.character,
                self.variant,
                e.error_type(),
                e
            ),
        }
    }
}

/// Summary of a generate run
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub lines: Vec<StatusLine>,
}

impl GenerateReport {
    pub fn succeeded(&self) -> usize {
        self.lines.iter().filter(|l| l.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.lines.len() - self.succeeded()
    }

    /// 0 only when every requested image was generated and written
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            0
        } else {
            1
        }
    }
}

/// Generate every variant of every character and write the images.
///
/// Failures are recorded per image; successful images are written even
/// when siblings fail.
pub async fn run_generate(
    client: &PortraitClient,
    settings: &Settings,
    output_dir: &Path,
) -> Result<GenerateReport> {
    settings.validate()?;
    let model_id = settings.model_id()?;
    let options = GenerateOptions {
        seed: settings.generation.seed,
        count: settings.generation.count,
        deadline: settings.backend.timeout_ms.map(Duration::from_millis),
    };
    let writer = OutputWriter::new(output_dir);
    let numbered = options.count > 1;

    let mut report = GenerateReport::default();
    for character in &settings.characters {
        info!(character = %character.name, "Generating portraits");
        let slug = character.slug();
        let outcomes = client
            .generate_many(
                &settings.world,
                character,
                &settings.variants,
                &model_id,
                &options,
            )
            .await?;

        for (variant, results) in outcomes {
            for (index, outcome) in results.into_iter().enumerate() {
                let stem = if numbered {
                    format!("{}_{}", variant, index + 1)
                } else {
                    variant.clone()
                };
                let outcome = match outcome {
                    Ok(result) => writer
                        .write(&slug, &stem, &result)
                        .await
                        .map(|path| WrittenImage {
                            path,
                            cache_hit: result.cache_hit,
                        }),
                    Err(e) => Err(e),
                };
                report.lines.push(StatusLine {
                    character: slug.clone(),
                    variant: stem,
                    outcome,
                });
            }
        }
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Generation finished"
    );
    Ok(report)
}

/// List image models visible to the supplied credentials
pub async fn test_credentials(invoker: &BedrockInvoker) -> Result<Vec<String>> {
    let models = invoker.list_image_models().await?;
    info!(region = invoker.region(), models = models.len(), "Credentials OK");
    Ok(models)
}

/// Empty a file cache directory
pub async fn clear_cache(dir: &Path) -> Result<()> {
    FileCache::new(dir).clear().await
}
