//! Shared infrastructure for the redrive recovery tooling.
//!
//! This crate holds the pieces that are not specific to the recovery engine:
//! - `config`: YAML configuration loading, merging, and env interpolation
//! - `error`: common error types
//! - `tracing`: subscriber initialization for CLI entry points

pub mod config;
pub mod error;
pub mod tracing;

// Re-export commonly used items
pub use config::{ComponentKey, ConfigPath, ConfigSources, Mergeable, load_from_paths};
pub use error::ConfigError;
pub use tracing::init_tracing;
