//! Multi-file configuration loading.
//!
//! Registry configuration may be split across several YAML files, one per
//! routing engine or per environment. Files are loaded independently and
//! merged, with duplicate component names rejected.

use std::path::Path;

use indexmap::IndexMap;

use crate::config::{ConfigPath, interpolate, is_yaml_file};
use crate::error::ConfigError;

/// Trait for configs that can be merged from multiple files.
pub trait Mergeable: Sized + Default {
    type Key: Eq + std::hash::Hash + Clone + std::fmt::Display;
    type Component;

    fn components_mut(&mut self) -> &mut IndexMap<Self::Key, Self::Component>;
    fn parse_yaml(contents: &str) -> Result<Self, ConfigError>;

    /// Merge another partial config into this one.
    ///
    /// Component keys must be unique across all loaded files.
    fn merge(&mut self, mut other: Self) -> Result<(), ConfigError> {
        let duplicates: Vec<String> = other
            .components_mut()
            .keys()
            .filter(|key| self.components_mut().contains_key(*key))
            .map(|key| key.to_string())
            .collect();

        if !duplicates.is_empty() {
            return Err(ConfigError::DuplicateComponents { keys: duplicates });
        }

        for (key, component) in other.components_mut().drain(..) {
            self.components_mut().insert(key, component);
        }
        Ok(())
    }
}

/// Load and merge a config from a list of file and directory sources.
///
/// All sources are attempted; errors are accumulated so a single bad file
/// reports alongside the others instead of masking them.
pub fn load_from_paths<C: Mergeable>(paths: &[ConfigPath]) -> Result<C, ConfigError> {
    let mut config = C::default();
    let mut errors = Vec::new();

    for path in paths {
        let (display, loaded) = match path {
            ConfigPath::File(file_path) => (file_path.display(), load_file::<C>(file_path)),
            ConfigPath::Dir(dir_path) => (dir_path.display(), load_dir::<C>(dir_path)),
        };
        let result = loaded.and_then(|partial| config.merge(partial));
        if let Err(e) = result {
            errors.push(format!("{display}: {e}"));
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::MultipleErrors { errors });
    }
    Ok(config)
}

fn load_file<C: Mergeable>(path: &Path) -> Result<C, ConfigError> {
    if !is_yaml_file(path) {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let contents =
        std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile { source })?;

    let result = interpolate(&contents);
    if !result.is_ok() {
        return Err(ConfigError::EnvInterpolation {
            message: result.errors.join("\n"),
        });
    }

    C::parse_yaml(&result.text)
}

fn load_dir<C: Mergeable>(dir: &Path) -> Result<C, ConfigError> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map_err(|source| ConfigError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_yaml_file(path))
        .collect();

    files.sort();

    let mut config = C::default();
    let mut errors = Vec::new();

    for path in files {
        let result = load_file::<C>(&path).and_then(|partial| config.merge(partial));
        if let Err(e) = result {
            errors.push(format!("{}: {e}", path.display()));
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::MultipleErrors { errors });
    }
    Ok(config)
}
