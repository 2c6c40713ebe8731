//! Generated portrait results, image post-processing and file output

pub mod base64;
pub mod file;
pub mod processing;

use serde::{Deserialize, Serialize};

pub use processing::{ImageProcessor, NormalizedImage};

/// One generated portrait variant, owned by the caller after return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortraitResult {
    pub variant_name: String,
    pub width: u32,
    pub height: u32,
    /// Encoded image (PNG from every supported backend)
    #[serde(with = "crate::response::base64::as_base64")]
    pub image_bytes: Vec<u8>,
    pub model_id: String,
    pub seed_used: u64,
    /// Set per call; not meaningful inside a stored entry
    #[serde(default, skip_serializing)]
    pub cache_hit: bool,
}

impl PortraitResult {
    /// Copy of a stored result relabelled for the variant that requested it
    pub fn from_cache(&self, variant_name: &str) -> Self {
        Self {
            variant_name: variant_name.to_string(),
            cache_hit: true,
            ..self.clone()
        }
    }

    /// Size of the encoded image in bytes
    pub fn len(&self) -> usize {
        self.image_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_bytes.is_empty()
    }
}
