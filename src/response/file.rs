//! Writes generated portraits to an output directory

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::response::PortraitResult;

/// Writer for `<output>/<character>/<file stem>.<ext>` files
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save one result and return the written path
    pub async fn write(
        &self,
        character_slug: &str,
        file_stem: &str,
        result: &PortraitResult,
    ) -> Result<PathBuf> {
        let dir = self.output_dir.join(character_slug);
        fs::create_dir_all(&dir).await?;

        let extension = detect_image_format(&result.image_bytes).unwrap_or("png");
        let path = dir.join(format!("{}.{}", file_stem, extension));
        fs::write(&path, &result.image_bytes).await?;

        debug!(path = ?path, size = result.image_bytes.len(), "Saved image file");
        Ok(path)
    }
}

/// Detect image format from binary data using magic bytes
pub fn detect_image_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("webp");
    }

    None
}
