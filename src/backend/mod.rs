//! Backend module - adapters, invoker traits and the Bedrock HTTP client

pub mod adapters;
pub mod http_backend;
pub mod traits;

use crate::error::{AppError, Result};

pub use adapters::ModelAdapter;
pub use http_backend::{BedrockConfig, BedrockInvoker};
pub use traits::{DecodedImage, GenerationRequest, ImageInvoker, ImageModel};

/// Model shortnames accepted in configuration and on the command line
pub const MODEL_SHORTNAMES: &[(&str, &str)] = &[
    ("titan", "amazon.titan-image-generator-v1"),
    ("sdxl", "stability.stable-diffusion-xl-v1"),
    ("sd35", "stability.sd3-5-large-v1:0"),
];

/// Resolve a shortname to a full model id; dotted names pass through verbatim
pub fn resolve_model_id(name: &str) -> Result<String> {
    let name = name.trim();
    if let Some((_, id)) = MODEL_SHORTNAMES
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(name))
    {
        return Ok((*id).to_string());
    }
    if name.contains('.') {
        return Ok(name.to_string());
    }

    let known: Vec<&str> = MODEL_SHORTNAMES.iter().map(|(short, _)| *short).collect();
    Err(AppError::Validation(format!(
        "unknown model '{}', expected one of {:?} or a full model id",
        name, known
    )))
}
