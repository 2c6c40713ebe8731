//! Concurrency helpers for the generation pipeline

pub mod single_flight;

pub use single_flight::{KeyGuard, KeyedLocks};
