//! Error types for the redrive recovery tool.

use std::path::PathBuf;

use snafu::prelude::*;

// Re-export common errors
pub use redrive_common::error::ConfigError;

/// Outcome classification for a failed delivery attempt.
///
/// Exactly two variants are recognized at the recovery layer. Every
/// delivery backend maps its internal errors into one of these before
/// they reach the recovery engine.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SendError {
    /// The event's structure makes it permanently unsendable. Retrying
    /// within this run cannot succeed.
    #[snafu(display("Malformed event: {name}"))]
    Malformed { name: String },

    /// Any other failure, including transient backend and network
    /// problems. The event may succeed on a later run.
    #[snafu(display("{message}"))]
    Delivery { message: String },
}

/// Errors that can occur while reading or acknowledging a failure queue.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// Failed to list the failure queue directory.
    #[snafu(display("Failed to scan failure queue {}", dir.display()))]
    QueueScan {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a failure queue file.
    #[snafu(display("Failed to read failure queue file {}", path.display()))]
    QueueRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to rewrite a partially consumed queue file.
    #[snafu(display("Failed to rewrite failure queue file {}", path.display()))]
    QueueRewrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove a fully consumed queue file.
    #[snafu(display("Failed to remove failure queue file {}", path.display()))]
    QueueRemove {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize a failure record during rewrite.
    #[snafu(display("Failed to serialize failure record"))]
    RecordSerialize { source: serde_json::Error },

    /// A commit was requested for more events than are claimed.
    #[snafu(display("Commit of {requested} events exceeds {outstanding} outstanding claims"))]
    CommitBeyondClaim { requested: usize, outstanding: usize },
}

/// Errors that can occur while building the backend registry.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RegistryError {
    /// Failed to construct the HTTP client for a backend.
    #[snafu(display("Failed to build HTTP client for backend '{backend}'"))]
    HttpClient {
        backend: String,
        source: reqwest::Error,
    },

    /// Failed to open the delivery target for a file backend.
    #[snafu(display("Failed to open delivery file for backend '{backend}'"))]
    DeliveryFile {
        backend: String,
        source: std::io::Error,
    },
}
