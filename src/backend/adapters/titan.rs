//! Amazon Titan Image Generator wire format

use serde_json::{json, Value};

use crate::backend::traits::{classify_refusal, no_image, truncate_chars, DecodedImage, ImageModel};
use crate::error::Result;
use crate::response::base64;

const MAX_PROMPT_LENGTH: usize = 512;
const MAX_NEGATIVE_LENGTH: usize = 512;
const SEED_UPPER_BOUND: u64 = 2_147_483_646;
const MAX_DIMENSION: u32 = 1408;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitanAdapter;

impl ImageModel for TitanAdapter {
    fn family(&self) -> &'static str {
        "titan"
    }

    fn max_prompt_length(&self) -> usize {
        MAX_PROMPT_LENGTH
    }

    fn max_negative_length(&self) -> Option<usize> {
        Some(MAX_NEGATIVE_LENGTH)
    }

    fn seed_upper_bound(&self) -> u64 {
        SEED_UPPER_BOUND
    }

    fn encode(&self, prompt: &str, negative: &str, size: u32, seed: u64) -> Result<Value> {
        self.check_negative(negative)?;
        let dimension = size.min(MAX_DIMENSION);

        let mut text_params = json!({
            "text": truncate_chars(prompt, MAX_PROMPT_LENGTH),
        });
        if !negative.trim().is_empty() {
            text_params["negativeText"] = Value::String(negative.to_string());
        }

        Ok(json!({
            "taskType": "TEXT_IMAGE",
            "textToImageParams": text_params,
            "imageGenerationConfig": {
                "numberOfImages": 1,
                "quality": "premium",
                "height": dimension,
                "width": dimension,
                "cfgScale": 8.0,
                "seed": seed,
            },
        }))
    }

    fn decode(&self, response: &Value) -> Result<DecodedImage> {
        if let Some(error) = response.get("error").and_then(Value::as_str) {
            return Err(classify_refusal(error));
        }

        let image = response
            .get("images")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(Value::as_str)
            .ok_or_else(no_image)?;

        Ok(DecodedImage {
            bytes: base64::decode(image)?,
            seed: None,
        })
    }
}
