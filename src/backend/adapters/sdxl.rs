//! Stability SDXL wire format
//!
//! SDXL carries the negative prompt as a second weighted text prompt
//! rather than a dedicated field.

use serde_json::{json, Value};

use crate::backend::traits::{no_image, truncate_chars, DecodedImage, ImageModel};
use crate::error::{AppError, Result};
use crate::response::base64;

const MAX_PROMPT_LENGTH: usize = 2000;
const SEED_UPPER_BOUND: u64 = 4_294_967_294;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SdxlAdapter;

impl ImageModel for SdxlAdapter {
    fn family(&self) -> &'static str {
        "sdxl"
    }

    fn max_prompt_length(&self) -> usize {
        MAX_PROMPT_LENGTH
    }

    fn max_negative_length(&self) -> Option<usize> {
        Some(MAX_PROMPT_LENGTH)
    }

    fn seed_upper_bound(&self) -> u64 {
        SEED_UPPER_BOUND
    }

    fn encode(&self, prompt: &str, negative: &str, size: u32, seed: u64) -> Result<Value> {
        self.check_negative(negative)?;

        let mut text_prompts = vec![json!({
            "text": truncate_chars(prompt, MAX_PROMPT_LENGTH),
            "weight": 1.0,
        })];
        if !negative.trim().is_empty() {
            text_prompts.push(json!({
                "text": negative,
                "weight": -1.0,
            }));
        }

        Ok(json!({
            "text_prompts": text_prompts,
            "cfg_scale": 7,
            "seed": seed,
            "steps": 50,
            "width": size,
            "height": size,
        }))
    }

    fn decode(&self, response: &Value) -> Result<DecodedImage> {
        let artifact = response
            .get("artifacts")
            .and_then(Value::as_array)
            .and_then(|artifacts| artifacts.first())
            .ok_or_else(no_image)?;

        match artifact.get("finishReason").and_then(Value::as_str).unwrap_or("") {
            "" | "SUCCESS" | "END_OF_TEXT" => {}
            "CONTENT_FILTERED" => {
                return Err(AppError::ContentFiltered(
                    "blocked by safety filter".to_string(),
                ))
            }
            other => return Err(AppError::Backend(format!("generation failed: {}", other))),
        }

        let image = artifact
            .get("base64")
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())
            .ok_or_else(no_image)?;

        Ok(DecodedImage {
            bytes: base64::decode(image)?,
            seed: artifact.get("seed").and_then(Value::as_u64),
        })
    }
}
