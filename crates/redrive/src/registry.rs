//! Backend registry construction.
//!
//! Builds the runtime registry of routing engines from the registry
//! configuration. Each routing engine groups delivery backends under one
//! logical recovery-selectable name; each backend is paired with its
//! failure store.

use indexmap::IndexMap;

use redrive_common::config::ComponentKey;

use crate::backend::{DeliveryBackend, FileBackend, HttpBackend};
use crate::config::{DeliveryConfig, RegistryConfig};
use crate::error::{DeliveryFileSnafu, HttpClientSnafu, RegistryError};
use crate::store::{FailureStore, NdjsonFailureStore};
use snafu::prelude::*;

/// A delivery backend paired with its failure queue.
pub struct RecoverableBackend {
    pub backend: Box<dyn DeliveryBackend>,
    pub store: Box<dyn FailureStore>,
}

/// A group of delivery backends under one logical name.
pub struct RoutingEngine {
    recovery: bool,
    backends: IndexMap<ComponentKey, RecoverableBackend>,
}

impl RoutingEngine {
    pub fn new(recovery: bool) -> Self {
        Self {
            recovery,
            backends: IndexMap::new(),
        }
    }

    /// Whether this engine participates in recovery runs.
    pub fn supports_recovery(&self) -> bool {
        self.recovery
    }

    pub fn add_backend(&mut self, name: ComponentKey, backend: RecoverableBackend) {
        self.backends.insert(name, backend);
    }

    /// Iterate backends in registration order.
    pub fn backends_mut(
        &mut self,
    ) -> impl Iterator<Item = (&ComponentKey, &mut RecoverableBackend)> {
        self.backends.iter_mut()
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }
}

/// Routing engines by logical name, in configuration order.
pub type Registry = IndexMap<ComponentKey, RoutingEngine>;

/// Build the runtime registry from configuration.
pub fn build_registry(config: &RegistryConfig) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    for (engine_name, engine_config) in &config.engines {
        let mut engine = RoutingEngine::new(engine_config.recovery);

        for (backend_name, backend_config) in &engine_config.backends {
            let backend: Box<dyn DeliveryBackend> = match &backend_config.delivery {
                DeliveryConfig::Http {
                    endpoint,
                    headers,
                    batch_size,
                    timeout_secs,
                } => Box::new(
                    HttpBackend::new(
                        endpoint.clone(),
                        headers.clone(),
                        *batch_size,
                        *timeout_secs,
                    )
                    .context(HttpClientSnafu {
                        backend: backend_name.to_string(),
                    })?,
                ),
                DeliveryConfig::File { path } => {
                    Box::new(FileBackend::open(path).context(DeliveryFileSnafu {
                        backend: backend_name.to_string(),
                    })?)
                }
            };

            let store = Box::new(NdjsonFailureStore::open(&backend_config.queue_dir));
            engine.add_backend(backend_name.clone(), RecoverableBackend { backend, store });
        }

        registry.insert(engine_name.clone(), engine);
    }

    Ok(registry)
}
