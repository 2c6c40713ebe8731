//! Common traits and types for image generation backends

use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Request derived per variant; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative: String,
    pub model_id: String,
    /// Target variant size (not the generation size)
    pub size: u32,
    pub seed: u64,
}

/// Image bytes recovered from a backend response
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// Seed reported by the backend, if it echoes one
    pub seed: Option<u64>,
}

/// Wire-format capability shared by every model family
pub trait ImageModel {
    /// Short family tag used in logs
    fn family(&self) -> &'static str;

    /// Maximum prompt length in characters
    fn max_prompt_length(&self) -> usize;

    /// Maximum negative prompt length in characters, `None` when unbounded
    fn max_negative_length(&self) -> Option<usize>;

    /// Largest seed the backend accepts (inclusive)
    fn seed_upper_bound(&self) -> u64;

    /// Build the request body for one generation at `size` x `size`
    fn encode(&self, prompt: &str, negative: &str, size: u32, seed: u64) -> Result<Value>;

    /// Pull the generated image out of a response body
    fn decode(&self, response: &Value) -> Result<DecodedImage>;

    /// Reject negative prompts the backend cannot carry
    fn check_negative(&self, negative: &str) -> Result<()> {
        match self.max_negative_length() {
            Some(limit) if negative.chars().count() > limit => Err(AppError::Validation(format!(
                "negative prompt is {} characters, {} accepts at most {}",
                negative.chars().count(),
                self.family(),
                limit
            ))),
            _ => Ok(()),
        }
    }
}

/// One synchronous call to a remote generation endpoint
#[async_trait]
pub trait ImageInvoker: Send + Sync {
    /// Invoker name used in logs
    fn name(&self) -> &str;

    /// Send `body` to `model_id` and return the parsed response body.
    ///
    /// Exactly one remote call per invocation; implementations never retry.
    /// `deadline` is forwarded to the transport as-is.
    async fn invoke(&self, model_id: &str, body: &Value, deadline: Option<Duration>)
        -> Result<Value>;
}

/// Cut `text` to at most `limit` characters, borrowing when it already fits
pub fn truncate_chars(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => Cow::Owned(text[..byte_index].to_string()),
        None => Cow::Borrowed(text),
    }
}

pub(crate) fn no_image() -> AppError {
    AppError::Decode("no image in response".to_string())
}

/// Map a backend-reported refusal to the moderation or generic backend error
pub(crate) fn classify_refusal(reason: &str) -> AppError {
    let lower = reason.to_lowercase();
    if lower.contains("filter") || lower.contains("blocked") || lower.contains("moderat") {
        AppError::ContentFiltered(reason.to_string())
    } else {
        AppError::Backend(format!("generation failed: {}", reason))
    }
}
