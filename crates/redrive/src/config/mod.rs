//! Registry configuration for the recovery tool.
//!
//! Describes the routing engines and delivery backends the run can
//! recover, including where each backend's failure queue lives and how
//! delivery is performed.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use redrive_common::config::{ComponentKey, ConfigPath, Mergeable, load_from_paths};
use redrive_common::error::ConfigError;

/// Main configuration: the backend registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Routing engines by logical name.
    #[serde(default)]
    pub engines: IndexMap<ComponentKey, EngineConfig>,
}

/// Configuration for one routing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether this engine participates in recovery runs.
    ///
    /// Registry entries that are not recovery-capable are excluded before
    /// backend selection.
    #[serde(default = "default_recovery")]
    pub recovery: bool,
    /// Delivery backends by name.
    pub backends: IndexMap<ComponentKey, BackendConfig>,
}

fn default_recovery() -> bool {
    true
}

/// Configuration for one delivery backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Directory holding this backend's failure queue (NDJSON files).
    pub queue_dir: String,
    /// How delivery is performed.
    pub delivery: DeliveryConfig,
}

/// Delivery transport for a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeliveryConfig {
    /// POST events as JSON to an HTTP endpoint.
    Http {
        endpoint: String,
        /// Extra headers, e.g. authorization.
        #[serde(default)]
        headers: HashMap<String, String>,
        /// Outgoing batch size used outside recovery runs.
        #[serde(default = "default_outgoing_batch_size")]
        batch_size: usize,
        /// Request timeout in seconds.
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
    /// Append events as NDJSON to a local file.
    File { path: String },
}

fn default_outgoing_batch_size() -> usize {
    50
}

fn default_timeout() -> u64 {
    30
}

impl RegistryConfig {
    /// Load configuration from file and directory sources.
    pub fn from_paths(paths: &[ConfigPath]) -> Result<Self, ConfigError> {
        let config: Self = load_from_paths(paths)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// An empty `engines` map is allowed; it surfaces later as a normal
    /// "no compatible backend" run, not a configuration error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (engine_name, engine) in &self.engines {
            if engine.backends.is_empty() {
                return Err(ConfigError::NoBackends {
                    engine: engine_name.to_string(),
                });
            }
            for (backend_name, backend) in &engine.backends {
                if backend.queue_dir.is_empty() {
                    return Err(ConfigError::EmptyQueueDir {
                        backend: backend_name.to_string(),
                    });
                }
                match &backend.delivery {
                    DeliveryConfig::Http { endpoint, .. } if endpoint.is_empty() => {
                        return Err(ConfigError::EmptyEndpoint {
                            backend: backend_name.to_string(),
                        });
                    }
                    DeliveryConfig::File { path } if path.is_empty() => {
                        return Err(ConfigError::EmptyDeliveryPath {
                            backend: backend_name.to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl Mergeable for RegistryConfig {
    type Key = ComponentKey;
    type Component = EngineConfig;

    fn components_mut(&mut self) -> &mut IndexMap<ComponentKey, EngineConfig> {
        &mut self.engines
    }

    fn parse_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::YamlParse { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
engines:
  xapi:
    backends:
      lrs:
        queue_dir: /var/lib/redrive/xapi/lrs
        delivery:
          type: http
          endpoint: https://lrs.example.com/statements
          batch_size: 25
"#;
        let config = RegistryConfig::parse_yaml(yaml).unwrap();
        config.validate().unwrap();

        let engine = config.engines.get(&ComponentKey::new("xapi")).unwrap();
        assert!(engine.recovery);

        let backend = engine.backends.get(&ComponentKey::new("lrs")).unwrap();
        assert_eq!(backend.queue_dir, "/var/lib/redrive/xapi/lrs");
        match &backend.delivery {
            DeliveryConfig::Http {
                endpoint,
                batch_size,
                timeout_secs,
                ..
            } => {
                assert_eq!(endpoint, "https://lrs.example.com/statements");
                assert_eq!(*batch_size, 25);
                assert_eq!(*timeout_secs, 30);
            }
            other => panic!("expected http delivery, got {other:?}"),
        }
    }

    #[test]
    fn test_recovery_flag_opt_out() {
        let yaml = r#"
engines:
  segment:
    recovery: false
    backends:
      sink:
        queue_dir: /tmp/q
        delivery:
          type: file
          path: /tmp/out.ndjson
"#;
        let config = RegistryConfig::parse_yaml(yaml).unwrap();
        let engine = config.engines.get(&ComponentKey::new("segment")).unwrap();
        assert!(!engine.recovery);
    }

    #[test]
    fn test_empty_engines_is_valid() {
        let config = RegistryConfig::parse_yaml("engines: {}").unwrap();
        config.validate().unwrap();
        assert!(config.engines.is_empty());
    }

    #[test]
    fn test_validate_rejects_engine_without_backends() {
        let yaml = r#"
engines:
  xapi:
    backends: {}
"#;
        let config = RegistryConfig::parse_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NoBackends { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_queue_dir() {
        let yaml = r#"
engines:
  xapi:
    backends:
      lrs:
        queue_dir: ""
        delivery:
          type: file
          path: /tmp/out.ndjson
"#;
        let config = RegistryConfig::parse_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyQueueDir { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let yaml = r#"
engines:
  caliper:
    backends:
      analytics:
        queue_dir: /tmp/q
        delivery:
          type: http
          endpoint: ""
"#;
        let config = RegistryConfig::parse_yaml(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyEndpoint { .. }));
    }
}
