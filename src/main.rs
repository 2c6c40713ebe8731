//! Command line entry point for facegen

use anyhow::Context;
use clap::{Parser, Subcommand};
use facegen::{
    backend::{BedrockConfig, BedrockInvoker},
    commands::{self, TemplateFormat},
    config::{CacheKind, LoggingConfig, Settings},
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const TOKEN_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Generate character portraits with hosted text-to-image models
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a sample configuration
    InitConfig {
        #[arg(long, value_enum, default_value_t = TemplateFormat::Json)]
        format: TemplateFormat,
    },
    /// Generate every variant of every configured character
    Generate {
        /// Configuration file (JSON, TOML or YAML)
        config: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "portraits")]
        output: PathBuf,
        /// Extra characters: a JSON file or a directory of JSON files
        #[arg(long)]
        characters: Option<PathBuf>,
        /// Model shortname (titan, sdxl, sd35) or full model id
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Images per variant
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        no_cache: bool,
        #[arg(long)]
        cache_dir: Option<String>,
    },
    /// Check that the bearer token can list image models
    TestCredentials {
        #[arg(long, default_value = "us-east-1")]
        region: String,
    },
    /// Remove every entry from a file cache
    ClearCache {
        #[arg(long, default_value = ".facegen_cache")]
        cache_dir: PathBuf,
    },
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn bearer_token() -> Option<String> {
    std::env::var(TOKEN_ENV).ok()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig { format } => {
            init_logging(&LoggingConfig::default());
            print!("{}", commands::init_config(format)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate {
            config,
            output,
            characters,
            model,
            region,
            seed,
            count,
            no_cache,
            cache_dir,
        } => {
            let mut settings = Settings::load_from_path(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;
            init_logging(&settings.logging);

            if let Some(path) = characters {
                let extra = commands::load_characters(&path)
                    .await
                    .with_context(|| format!("failed to load characters from {}", path.display()))?;
                settings.characters.extend(extra);
            }
            if let Some(model) = model {
                settings.backend.model = model;
            }
            if let Some(region) = region {
                settings.backend.region = region;
            }
            if seed.is_some() {
                settings.generation.seed = seed;
            }
            if let Some(count) = count {
                settings.generation.count = count;
            }
            if no_cache {
                settings.cache.kind = CacheKind::Disabled;
            }
            if let Some(dir) = cache_dir {
                settings.cache.dir = dir;
            }
            settings.validate()?;

            let backend = BedrockConfig {
                endpoint_url: settings.backend.endpoint_url.clone(),
                control_endpoint_url: settings.backend.control_endpoint_url.clone(),
                timeout_ms: settings.backend.timeout_ms,
                ..BedrockConfig::new(settings.backend.region.clone())
            }
            .with_bearer_token(bearer_token());
            let client = commands::build_client(&settings, Arc::new(BedrockInvoker::new(backend)));

            info!(
                characters = settings.characters.len(),
                variants = settings.variants.len(),
                model = %settings.backend.model,
                cache = client.cache_name(),
                "Starting generation"
            );
            let report = commands::run_generate(&client, &settings, &output).await?;
            for line in &report.lines {
                eprintln!("{}", line);
            }
            eprintln!(
                "{} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            );
            Ok(ExitCode::from(report.exit_code() as u8))
        }
        Command::TestCredentials { region } => {
            init_logging(&LoggingConfig::default());
            let invoker =
                BedrockInvoker::new(BedrockConfig::new(region).with_bearer_token(bearer_token()));
            match commands::test_credentials(&invoker).await {
                Ok(models) => {
                    println!("Credentials OK, {} image models available:", models.len());
                    for model in models {
                        println!("  {}", model);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!(error_type = e.error_type(), error = %e, "Credential check failed");
                    eprintln!("Credential check failed: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::ClearCache { cache_dir } => {
            init_logging(&LoggingConfig::default());
            commands::clear_cache(&cache_dir).await?;
            println!("Cleared {}", cache_dir.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
