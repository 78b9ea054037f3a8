//! Configuration source types for multi-file loading.

use std::path::{Path, PathBuf};

use clap::Args;

/// A configuration source, either a single file or a directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigPath {
    /// A single configuration file.
    File(PathBuf),
    /// A directory containing configuration files.
    Dir(PathBuf),
}

/// Check if a path has a YAML extension.
pub fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// CLI flags selecting configuration sources.
///
/// Flattened into application argument structs so every binary accepts the
/// same `--config` / `--config-dir` flags.
#[derive(Args, Debug)]
pub struct ConfigSources {
    /// Path to configuration file (can be specified multiple times)
    #[arg(short, long)]
    pub config: Vec<PathBuf>,

    /// Path to configuration directory (can be specified multiple times)
    #[arg(short = 'C', long = "config-dir")]
    pub config_dirs: Vec<PathBuf>,
}

impl ConfigSources {
    /// Combine file and directory flags into a single ordered list.
    ///
    /// Files come first, then directories, preserving the order within
    /// each group.
    pub fn config_paths(&self) -> Vec<ConfigPath> {
        self.config
            .iter()
            .map(|p| ConfigPath::File(p.clone()))
            .chain(self.config_dirs.iter().map(|p| ConfigPath::Dir(p.clone())))
            .collect()
    }
}
