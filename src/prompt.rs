//! Prompt composition from world, character and variant specs

use crate::error::{AppError, Result};
use crate::specs::{CharacterSpec, VariantSpec, WorldSpec};

/// Number of leading context sentences kept in the setting line
const SETTING_SENTENCES: usize = 2;

/// Final prompt pair handed to an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub prompt: String,
    pub negative: String,
}

/// Compose the prompt for one variant.
///
/// Blocks appear in fixed order (frame, identity, description, setting,
/// style) separated by blank lines; empty blocks are skipped. The result
/// is never truncated here, adapters apply their own limits.
pub fn compose(
    world: &WorldSpec,
    character: &CharacterSpec,
    variant: &VariantSpec,
) -> Result<ComposedPrompt> {
    compose_with_frame(world, character, &variant.prompt_frame)
}

/// Compose using an explicit frame string
pub fn compose_with_frame(
    world: &WorldSpec,
    character: &CharacterSpec,
    frame: &str,
) -> Result<ComposedPrompt> {
    let frame = collapse_whitespace(frame);
    if frame.is_empty() {
        return Err(AppError::Validation("prompt frame cannot be empty".to_string()));
    }
    let name = collapse_whitespace(&character.name);
    if name.is_empty() {
        return Err(AppError::Validation(
            "character name cannot be empty".to_string(),
        ));
    }

    let role = collapse_whitespace(&character.role);
    let identity = if role.is_empty() {
        name
    } else {
        format!("{}, {}", name, role)
    };

    let setting = summarize_context(&world.context);
    let style = collapse_whitespace(&world.style);

    let blocks = [
        frame,
        identity,
        collapse_whitespace(&character.description),
        labelled("Setting", setting),
        labelled("Style", style),
    ];

    let prompt = blocks
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(ComposedPrompt {
        prompt,
        negative: world.negative.trim().to_string(),
    })
}

/// First two period-delimited segments of the context, re-terminated
pub fn summarize_context(context: &str) -> String {
    let sentences: Vec<String> = context
        .split('.')
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .take(SETTING_SENTENCES)
        .collect();

    if sentences.is_empty() {
        return String::new();
    }
    format!("{}.", sentences.join(". "))
}

fn labelled(label: &str, text: String) -> String {
    if text.is_empty() {
        text
    } else {
        format!("{}: {}", label, text)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
