//! Common error types shared across the redrive workspace.

use std::path::PathBuf;

use snafu::prelude::*;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to list a configuration directory.
    #[snafu(display("Failed to read configuration directory {}", path.display()))]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration file is not YAML.
    #[snafu(display("Unsupported configuration format: {}", path.display()))]
    UnsupportedFormat { path: PathBuf },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// The same component was defined in more than one configuration file.
    #[snafu(display("Duplicate component definitions: {}", keys.join(", ")))]
    DuplicateComponents { keys: Vec<String> },

    /// Several configuration sources failed to load.
    #[snafu(display("Failed to load configuration:\n{}", errors.join("\n")))]
    MultipleErrors { errors: Vec<String> },

    /// A routing engine has no delivery backends.
    #[snafu(display("Routing engine '{engine}' has no backends"))]
    NoBackends { engine: String },

    /// A backend is missing its failure queue location.
    #[snafu(display("Backend '{backend}' has an empty queue_dir"))]
    EmptyQueueDir { backend: String },

    /// An HTTP backend is missing its endpoint.
    #[snafu(display("Backend '{backend}' has an empty endpoint"))]
    EmptyEndpoint { backend: String },

    /// A file backend is missing its output path.
    #[snafu(display("Backend '{backend}' has an empty delivery path"))]
    EmptyDeliveryPath { backend: String },
}
