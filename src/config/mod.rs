//! Configuration module

pub mod settings;

pub use settings::{
    BackendConfig, CacheConfig, CacheKind, GenerationConfig, LoggingConfig, Settings,
};
