//! Character portrait generation
//!
//! Composes prompts from world, character and variant specs, invokes a
//! hosted text-to-image model, normalizes the result to the requested size
//! and caches it by a content fingerprint.

pub mod backend;
pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod queue;
pub mod response;
pub mod specs;

pub use client::{GenerateOptions, PortraitClient, SeedSource, VariantOutcome};
pub use error::{AppError, Result};
pub use response::PortraitResult;
pub use specs::{CharacterSpec, VariantSpec, WorldSpec, CANONICAL_SIZE};
