//! Redrive: recovery tool for the event-delivery pipeline.
//!
//! When a delivery backend fails to deliver tracking events, the pipeline
//! parks them in a durable per-backend failure queue. This crate drains
//! those queues in bounded batches and retries delivery:
//! - Selecting recovery-capable routing engines by name or `all`
//! - Pulling failed events from NDJSON failure queues
//! - Re-sending each event and classifying the outcome
//! - Aggregating run-wide success/malformed/failed counters

pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod metrics;
pub mod registry;
pub mod store;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config::RegistryConfig;
pub use engine::{RecoveryFilter, RecoveryOptions, RecoveryStats, run_recovery};
pub use error::{RegistryError, SendError, StoreError};
pub use registry::{Registry, build_registry};

// Re-export from redrive-common
pub use redrive_common::{ComponentKey, ConfigError, init_tracing};
