//! Generic component identifier.
//!
//! Identifies a named component in the registry configuration. Used for
//! routing engine names and delivery backend names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a named registry component.
///
/// A transparent wrapper around a String that provides consistent
/// identification semantics across the codebase.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentKey(String);

impl ComponentKey {
    /// Create a new component key from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying identifier string.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ComponentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
