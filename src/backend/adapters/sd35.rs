//! Stability SD3.5 wire format

use serde_json::{json, Value};

use crate::backend::traits::{classify_refusal, no_image, truncate_chars, DecodedImage, ImageModel};
use crate::error::Result;
use crate::response::base64;

const MAX_PROMPT_LENGTH: usize = 10_000;
const SEED_UPPER_BOUND: u64 = 4_294_967_294;

/// SD3.5 takes an aspect ratio instead of pixel dimensions; portraits are square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sd35Adapter;

impl ImageModel for Sd35Adapter {
    fn family(&self) -> &'static str {
        "sd35"
    }

    fn max_prompt_length(&self) -> usize {
        MAX_PROMPT_LENGTH
    }

    fn max_negative_length(&self) -> Option<usize> {
        None
    }

    fn seed_upper_bound(&self) -> u64 {
        SEED_UPPER_BOUND
    }

    fn encode(&self, prompt: &str, negative: &str, _size: u32, seed: u64) -> Result<Value> {
        let mut body = json!({
            "prompt": truncate_chars(prompt, MAX_PROMPT_LENGTH),
            "mode": "text-to-image",
            "aspect_ratio": "1:1",
            "output_format": "png",
            "seed": seed,
        });
        if !negative.trim().is_empty() {
            body["negative_prompt"] = Value::String(negative.to_string());
        }
        Ok(body)
    }

    fn decode(&self, response: &Value) -> Result<DecodedImage> {
        let reason = response
            .get("finish_reasons")
            .and_then(Value::as_array)
            .and_then(|reasons| reasons.first())
            .and_then(Value::as_str);
        if let Some(reason) = reason {
            return Err(classify_refusal(reason));
        }

        let image = response
            .get("images")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(Value::as_str)
            .ok_or_else(no_image)?;

        let seed = response
            .get("seeds")
            .and_then(Value::as_array)
            .and_then(|seeds| seeds.first())
            .and_then(Value::as_u64);

        Ok(DecodedImage {
            bytes: base64::decode(image)?,
            seed,
        })
    }
}
