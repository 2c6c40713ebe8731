//! Unit tests for prompt composition

use facegen::prompt::{compose, compose_with_frame, summarize_context};
use facegen::{AppError, CharacterSpec, VariantSpec, WorldSpec};

fn world() -> WorldSpec {
    WorldSpec::new(
        "A far-future station. Humans trade lemonade. Second sentence. Third sentence.",
        "  Clean   sci-fi illustration. ",
        "  text, watermark  ",
    )
}

#[test]
fn test_blocks_in_order() {
    let character = CharacterSpec::new("Tessa Quark", "Digger", "Dusty overalls.");
    let variant = VariantSpec::new("icon", 64, "Centered face icon.");

    let composed = compose(&world(), &character, &variant).unwrap();

    assert_eq!(
        composed.prompt,
        "Centered face icon.\n\n\
         Tessa Quark, Digger\n\n\
         Dusty overalls.\n\n\
         Setting: A far-future station. Humans trade lemonade.\n\n\
         Style: Clean sci-fi illustration."
    );
    assert_eq!(composed.negative, "text, watermark");
}

#[test]
fn test_empty_blocks_are_skipped() {
    let world = WorldSpec::default();
    let character = CharacterSpec::new("Nova", "Pilot", "");
    let composed = compose_with_frame(&world, &character, "Face.").unwrap();

    assert_eq!(composed.prompt, "Face.\n\nNova, Pilot");
    assert_eq!(composed.negative, "");
}

#[test]
fn test_composition_is_deterministic() {
    let character = CharacterSpec::new("Tessa Quark", "Digger", "");
    let variant = VariantSpec::new("icon", 64, "Face.");
    let a = compose(&world(), &character, &variant).unwrap();
    let b = compose(&world(), &character, &variant).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_blank_frame_rejected() {
    let character = CharacterSpec::new("Nova", "", "");
    let err = compose_with_frame(&world(), &character, " \n ").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_blank_name_rejected() {
    let character = CharacterSpec::new("  ", "Pilot", "");
    let err = compose_with_frame(&world(), &character, "Face.").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_long_prompts_are_not_truncated() {
    let character = CharacterSpec::new("Nova", "", "word ".repeat(500));
    let composed = compose_with_frame(&WorldSpec::default(), &character, "Face.").unwrap();
    assert!(composed.prompt.len() > 2000);
}

#[test]
fn test_summarize_context_without_periods() {
    assert_eq!(summarize_context("A quiet town"), "A quiet town.");
    assert_eq!(summarize_context("One.Two.Three"), "One. Two.");
}
