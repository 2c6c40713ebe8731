//! World, character and variant specifications
//!
//! Specs are plain values. Nothing in the pipeline mutates them; each
//! component borrows them and derives its own data.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Resolution every backend generates at before downscaling
pub const CANONICAL_SIZE: u32 = 1024;

/// Setting and art direction shared by every character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSpec {
    /// Setting description, lore and world details
    #[serde(default)]
    pub context: String,
    /// Visual style rules
    #[serde(default)]
    pub style: String,
    /// Elements to avoid, passed through as the negative prompt
    #[serde(default)]
    pub negative: String,
}

impl WorldSpec {
    pub fn new(
        context: impl Into<String>,
        style: impl Into<String>,
        negative: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            style: style.into(),
            negative: negative.into(),
        }
    }
}

/// Per-character identity and appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
}

impl CharacterSpec {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(
                "character name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// File-system friendly form of the character name
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for word in self.name.split_whitespace() {
            if !slug.is_empty() {
                slug.push('_');
            }
            slug.extend(
                word.chars()
                    .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                    .flat_map(char::to_lowercase),
            );
        }
        slug
    }
}

/// A named output: target size plus framing instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub name: String,
    pub size: u32,
    pub prompt_frame: String,
}

impl VariantSpec {
    pub fn new(name: impl Into<String>, size: u32, prompt_frame: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            prompt_frame: prompt_frame.into(),
        }
    }

    /// Check name, frame and size against the canonical resolution
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("variant name cannot be empty".to_string()));
        }
        if self.prompt_frame.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "variant '{}' has an empty prompt frame",
                self.name
            )));
        }
        if self.size == 0 {
            return Err(AppError::Validation(format!(
                "variant '{}' size must be positive",
                self.name
            )));
        }
        if self.size > CANONICAL_SIZE {
            return Err(AppError::Validation(format!(
                "variant '{}' size {} exceeds maximum {}",
                self.name, self.size, CANONICAL_SIZE
            )));
        }
        Ok(())
    }
}

/// Reject requests where two variants share a name
pub fn ensure_unique_names(variants: &[VariantSpec]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for variant in variants {
        if !seen.insert(variant.name.as_str()) {
            return Err(AppError::Validation(format!(
                "duplicate variant name '{}'",
                variant.name
            )));
        }
    }
    Ok(())
}
