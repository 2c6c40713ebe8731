//! Post-processing of generated images: center crop and Lanczos downscale

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::specs::CANONICAL_SIZE;

/// Image resized to a variant's target size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Deterministic crop + resample from the canonical resolution.
///
/// Output depends only on the input bytes and target size.
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    canonical_size: u32,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor {
    pub fn new() -> Self {
        Self {
            canonical_size: CANONICAL_SIZE,
        }
    }

    pub fn canonical_size(&self) -> u32 {
        self.canonical_size
    }

    /// Bring `raw` down to `target` x `target`.
    ///
    /// At the canonical size the input is returned untouched. Larger targets
    /// are rejected; the processor never upscales.
    pub fn normalize(&self, raw: &[u8], target: u32) -> Result<NormalizedImage> {
        if target == 0 {
            return Err(AppError::Validation("target size must be positive".to_string()));
        }
        if target > self.canonical_size {
            return Err(unsupported_upscale());
        }

        if target == self.canonical_size {
            let (width, height) = dimensions(raw)?;
            return Ok(NormalizedImage {
                bytes: raw.to_vec(),
                width,
                height,
            });
        }

        let image = image::load_from_memory(raw)
            .map_err(|e| AppError::Decode(format!("generated bytes are not an image: {}", e)))?;
        let image = if image.color().has_alpha() {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };

        let square = center_crop_square(image);
        if target > square.width() {
            return Err(unsupported_upscale());
        }

        let resized = square.resize_exact(target, target, FilterType::Lanczos3);
        debug!(
            from = square.width(),
            to = target,
            "Downscaled generated image"
        );

        let mut buffer = Cursor::new(Vec::new());
        resized
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| AppError::Decode(format!("failed to encode PNG: {}", e)))?;

        Ok(NormalizedImage {
            bytes: buffer.into_inner(),
            width: target,
            height: target,
        })
    }
}

/// Crop the centered square of side `min(width, height)`
pub fn center_crop_square(image: DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width == height {
        return image;
    }
    let side = width.min(height);
    let left = (width - side) / 2;
    let top = (height - side) / 2;
    image.crop_imm(left, top, side, side)
}

fn dimensions(raw: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("failed to read image header: {}", e)))?
        .into_dimensions()
        .map_err(|e| AppError::Decode(format!("generated bytes are not an image: {}", e)))
}

fn unsupported_upscale() -> AppError {
    AppError::Validation("unsupported upscale".to_string())
}
