//! Per-family request/response adapters
//!
//! The set of families is closed; `ModelAdapter::for_model` is the single
//! dispatch rule. Adding a family means adding a variant and a prefix here.

pub mod sd35;
pub mod sdxl;
pub mod titan;

use serde_json::Value;

use crate::backend::traits::{DecodedImage, ImageModel};
use crate::error::Result;

pub use sd35::Sd35Adapter;
pub use sdxl::SdxlAdapter;
pub use titan::TitanAdapter;

/// Adapter selected for a model id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelAdapter {
    Titan(TitanAdapter),
    Sdxl(SdxlAdapter),
    Sd35(Sd35Adapter),
}

impl ModelAdapter {
    /// Select by model id prefix; SDXL is the fallback for unknown ids
    pub fn for_model(model_id: &str) -> Self {
        if model_id.starts_with("amazon.titan") {
            Self::Titan(TitanAdapter)
        } else if model_id.starts_with("stability.sd3") {
            Self::Sd35(Sd35Adapter)
        } else {
            Self::Sdxl(SdxlAdapter)
        }
    }
}

impl ImageModel for ModelAdapter {
    fn family(&self) -> &'static str {
        match self {
            Self::Titan(a) => a.family(),
            Self::Sdxl(a) => a.family(),
            Self::Sd35(a) => a.family(),
        }
    }

    fn max_prompt_length(&self) -> usize {
        match self {
            Self::Titan(a) => a.max_prompt_length(),
            Self::Sdxl(a) => a.max_prompt_length(),
            Self::Sd35(a) => a.max_prompt_length(),
        }
    }

    fn max_negative_length(&self) -> Option<usize> {
        match self {
            Self::Titan(a) => a.max_negative_length(),
            Self::Sdxl(a) => a.max_negative_length(),
            Self::Sd35(a) => a.max_negative_length(),
        }
    }

    fn seed_upper_bound(&self) -> u64 {
        match self {
            Self::Titan(a) => a.seed_upper_bound(),
            Self::Sdxl(a) => a.seed_upper_bound(),
            Self::Sd35(a) => a.seed_upper_bound(),
        }
    }

    fn encode(&self, prompt: &str, negative: &str, size: u32, seed: u64) -> Result<Value> {
        match self {
            Self::Titan(a) => a.encode(prompt, negative, size, seed),
            Self::Sdxl(a) => a.encode(prompt, negative, size, seed),
            Self::Sd35(a) => a.encode(prompt, negative, size, seed),
        }
    }

    fn decode(&self, response: &Value) -> Result<DecodedImage> {
        match self {
            Self::Titan(a) => a.decode(response),
            Self::Sdxl(a) => a.decode(response),
            Self::Sd35(a) => a.decode(response),
        }
    }
}
