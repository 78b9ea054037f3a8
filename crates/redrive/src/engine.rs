//! The recovery engine.
//!
//! Drains the failure queue of every selected delivery backend and
//! retries delivery, classifying each outcome and accumulating run-wide
//! counters. Per-event failures never abort the run; the goal is maximum
//! throughput of recoverable events even when a backend is partially
//! degraded.

use tracing::{error, info};

use redrive_common::config::ComponentKey;

use crate::backend::DeliveryOptions;
use crate::emit;
use crate::error::SendError;
use crate::metrics::events::{EventDeliveryFailed, EventMalformed, EventRecovered};
use crate::registry::{RecoverableBackend, Registry};

/// Which routing engines participate in a recovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryFilter {
    /// Every recovery-capable engine.
    All,
    /// Exactly the engine with this logical name, if present.
    Engine(ComponentKey),
}

impl RecoveryFilter {
    /// Parse the `--transformer-type` argument.
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            Self::All
        } else {
            Self::Engine(ComponentKey::new(raw))
        }
    }

    fn matches(&self, name: &ComponentKey) -> bool {
        match self {
            Self::All => true,
            Self::Engine(selected) => selected == name,
        }
    }
}

/// Per-run settings for the recovery engine.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryOptions {
    /// Maximum events pulled from a failure queue at a time.
    pub batch_size: usize,
    /// Options forwarded to every delivery attempt.
    pub delivery: DeliveryOptions,
}

impl RecoveryOptions {
    /// Options for a recovery run pulling `batch_size` events at a time.
    ///
    /// Batching inside delivery backends is disabled for the whole run so
    /// a single poisoned event cannot block delivery of the events pulled
    /// alongside it.
    pub fn new(batch_size: usize) -> Self {
        Self {
            // A zero-sized batch request would never advance the drain loop.
            batch_size: batch_size.max(1),
            delivery: DeliveryOptions {
                disable_batching: true,
            },
        }
    }
}

/// Run-wide recovery counters.
///
/// Their sum equals the total number of events claimed from failure
/// queues across the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Events successfully redelivered.
    pub success: u64,
    /// Events that are permanently unsendable.
    pub malformed: u64,
    /// Events whose delivery failed again.
    pub failed: u64,
}

impl RecoveryStats {
    /// Total number of events processed.
    pub fn total(&self) -> u64 {
        self.success + self.malformed + self.failed
    }
}

/// Drain and retry failed events for every selected backend.
///
/// Engines are processed in registry order, backends within an engine in
/// registration order, events within a batch in queue order. Selecting
/// nothing is a normal early termination, not an error.
pub async fn run_recovery(
    registry: &mut Registry,
    filter: &RecoveryFilter,
    options: &RecoveryOptions,
) -> RecoveryStats {
    let mut stats = RecoveryStats::default();

    if !registry.values().any(|engine| engine.supports_recovery()) {
        info!("No compatible backend found.");
        return stats;
    }

    for (engine_name, engine) in registry.iter_mut() {
        if !engine.supports_recovery() {
            continue;
        }
        if !filter.matches(engine_name) {
            info!("Skipping backend: {engine_name}");
            continue;
        }

        for (backend_name, entry) in engine.backends_mut() {
            drain_backend(backend_name, entry, options, &mut stats).await;
        }
    }

    info!("Recovery process completed.");
    info!("Recovered events  : {}", stats.success);
    info!("Failed to recover : {}", stats.failed);
    info!("Malformed events  : {}", stats.malformed);
    stats
}

/// Drain one backend's failure queue until a pull comes back empty.
///
/// This is a point-in-time drain: a live system may keep enqueuing new
/// failures after the run ends.
async fn drain_backend(
    backend_name: &ComponentKey,
    entry: &mut RecoverableBackend,
    options: &RecoveryOptions,
    stats: &mut RecoveryStats,
) {
    loop {
        let batch = match entry.store.claim(options.batch_size) {
            Ok(batch) => batch,
            Err(e) => {
                error!("Failed to read failure queue for backend {backend_name}: {e}");
                return;
            }
        };
        if batch.is_empty() {
            return;
        }

        info!(
            "Recovering {} failed events for backend {}",
            batch.len(),
            backend_name
        );

        for failed in &batch {
            match entry.backend.send(&failed.event, &options.delivery).await {
                Ok(()) => {
                    stats.success += 1;
                    emit!(EventRecovered {
                        backend: backend_name.to_string(),
                    });
                }
                Err(SendError::Malformed { .. }) => {
                    error!("Malformed event: {}", failed.event.name);
                    stats.malformed += 1;
                    emit!(EventMalformed {
                        backend: backend_name.to_string(),
                    });
                }
                Err(e) => {
                    error!("Failed to send event: {e}");
                    stats.failed += 1;
                    emit!(EventDeliveryFailed {
                        backend: backend_name.to_string(),
                    });
                }
            }
        }

        if let Err(e) = entry.store.commit(batch.len()) {
            error!("Failed to acknowledge recovered batch for backend {backend_name}: {e}");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::error::StoreError;
    use crate::event::{FailedEvent, TrackingEvent};
    use crate::registry::RoutingEngine;
    use crate::store::FailureStore;

    use super::*;

    #[derive(Clone, Copy)]
    enum Outcome {
        Delivered,
        Malformed,
        Failed,
    }

    #[derive(Default)]
    struct StoreLog {
        /// Size of each batch returned by claim, including the final empty one.
        pulls: Vec<usize>,
        commits: Vec<usize>,
    }

    struct ScriptedStore {
        pending: VecDeque<FailedEvent>,
        log: Arc<Mutex<StoreLog>>,
        fail_claim: bool,
    }

    impl FailureStore for ScriptedStore {
        fn claim(&mut self, limit: usize) -> Result<Vec<FailedEvent>, StoreError> {
            if self.fail_claim {
                return Err(StoreError::QueueRead {
                    path: "scripted".into(),
                    source: std::io::Error::other("disk on fire"),
                });
            }
            let take = limit.min(self.pending.len());
            let batch: Vec<FailedEvent> = self.pending.drain(..take).collect();
            self.log.lock().unwrap().pulls.push(batch.len());
            Ok(batch)
        }

        fn commit(&mut self, count: usize) -> Result<(), StoreError> {
            self.log.lock().unwrap().commits.push(count);
            Ok(())
        }
    }

    #[derive(Default)]
    struct SendLog {
        /// (event name, disable_batching) per attempt.
        sends: Vec<(String, bool)>,
    }

    struct ScriptedBackend {
        outcomes: HashMap<String, Outcome>,
        log: Arc<Mutex<SendLog>>,
    }

    #[async_trait]
    impl crate::backend::DeliveryBackend for ScriptedBackend {
        async fn send(
            &self,
            event: &TrackingEvent,
            options: &DeliveryOptions,
        ) -> Result<(), SendError> {
            self.log
                .lock()
                .unwrap()
                .sends
                .push((event.name.clone(), options.disable_batching));
            match self.outcomes.get(&event.name).unwrap_or(&Outcome::Delivered) {
                Outcome::Delivered => Ok(()),
                Outcome::Malformed => Err(SendError::Malformed {
                    name: event.name.clone(),
                }),
                Outcome::Failed => Err(SendError::Delivery {
                    message: format!("backend unavailable for {}", event.name),
                }),
            }
        }
    }

    fn failed_event(name: &str) -> FailedEvent {
        FailedEvent {
            event: TrackingEvent {
                name: name.to_string(),
                data: serde_json::json!({}),
            },
            error: "previous failure".to_string(),
            timestamp: Utc::now(),
            retry_count: 1,
        }
    }

    struct Harness {
        store_log: Arc<Mutex<StoreLog>>,
        send_log: Arc<Mutex<SendLog>>,
    }

    fn engine_with_backend(
        recovery: bool,
        events: &[&str],
        outcomes: &[(&str, Outcome)],
        fail_claim: bool,
    ) -> (RoutingEngine, Harness) {
        let store_log = Arc::new(Mutex::new(StoreLog::default()));
        let send_log = Arc::new(Mutex::new(SendLog::default()));

        let store = ScriptedStore {
            pending: events.iter().map(|name| failed_event(name)).collect(),
            log: store_log.clone(),
            fail_claim,
        };
        let backend = ScriptedBackend {
            outcomes: outcomes
                .iter()
                .map(|(name, outcome)| (name.to_string(), *outcome))
                .collect(),
            log: send_log.clone(),
        };

        let mut engine = RoutingEngine::new(recovery);
        engine.add_backend(
            ComponentKey::new("b1"),
            crate::registry::RecoverableBackend {
                backend: Box::new(backend),
                store: Box::new(store),
            },
        );

        (
            engine,
            Harness {
                store_log,
                send_log,
            },
        )
    }

    #[tokio::test]
    async fn test_mixed_outcomes_single_backend() {
        let (engine, harness) = engine_with_backend(
            true,
            &["e1", "e2"],
            &[("e2", Outcome::Malformed)],
            false,
        );
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::parse("xapi"),
            &RecoveryOptions::new(100),
        )
        .await;

        assert_eq!(
            stats,
            RecoveryStats {
                success: 1,
                malformed: 1,
                failed: 0
            }
        );

        // Two pulls: one full batch, one empty terminator.
        let store_log = harness.store_log.lock().unwrap();
        assert_eq!(store_log.pulls, vec![2, 0]);
        assert_eq!(store_log.commits, vec![2]);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_abort_batch() {
        let (engine, harness) = engine_with_backend(
            true,
            &["a", "b", "c"],
            &[("a", Outcome::Failed)],
            false,
        );
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(100),
        )
        .await;

        assert_eq!(
            stats,
            RecoveryStats {
                success: 2,
                malformed: 0,
                failed: 1
            }
        );

        // The failing first event did not stop its siblings.
        let sent: Vec<String> = harness
            .send_log
            .lock()
            .unwrap()
            .sends
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        assert_eq!(sent, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_batch_size_one_pulls_per_event() {
        let (engine, harness) =
            engine_with_backend(true, &["a", "b", "c"], &[], false);
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(1),
        )
        .await;

        assert_eq!(stats.success, 3);
        // Three single-event pulls followed by the empty terminator.
        assert_eq!(harness.store_log.lock().unwrap().pulls, vec![1, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_empty_queue_contributes_nothing() {
        let (engine, harness) = engine_with_backend(true, &[], &[], false);
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(100),
        )
        .await;

        assert_eq!(stats, RecoveryStats::default());
        assert_eq!(harness.store_log.lock().unwrap().pulls, vec![0]);
        assert!(harness.store_log.lock().unwrap().commits.is_empty());
    }

    #[tokio::test]
    async fn test_filter_mismatch_selects_nothing() {
        let (engine, harness) = engine_with_backend(true, &["a"], &[], false);
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::parse("caliper"),
            &RecoveryOptions::new(100),
        )
        .await;

        assert_eq!(stats, RecoveryStats::default());
        // The skipped backend's queue was never touched.
        assert!(harness.store_log.lock().unwrap().pulls.is_empty());
        assert!(harness.send_log.lock().unwrap().sends.is_empty());
    }

    #[tokio::test]
    async fn test_all_drains_capable_engines_only() {
        let (capable, capable_harness) =
            engine_with_backend(true, &["a", "b"], &[], false);
        let (incapable, incapable_harness) =
            engine_with_backend(false, &["x"], &[], false);

        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), capable);
        registry.insert(ComponentKey::new("segment"), incapable);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(100),
        )
        .await;

        assert_eq!(stats.success, 2);
        assert_eq!(stats.total(), 2);
        assert!(!capable_harness.store_log.lock().unwrap().pulls.is_empty());
        // Non-qualifying registry entries are never invoked.
        assert!(incapable_harness.store_log.lock().unwrap().pulls.is_empty());
        assert!(incapable_harness.send_log.lock().unwrap().sends.is_empty());
    }

    #[tokio::test]
    async fn test_no_capable_engine_ends_early() {
        let (incapable, harness) = engine_with_backend(false, &["x"], &[], false);
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("segment"), incapable);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(100),
        )
        .await;

        assert_eq!(stats, RecoveryStats::default());
        assert!(harness.store_log.lock().unwrap().pulls.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_moves_to_next_backend() {
        let (broken, broken_harness) = engine_with_backend(true, &["x"], &[], true);
        let (healthy, healthy_harness) =
            engine_with_backend(true, &["a"], &[], false);

        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("caliper"), broken);
        registry.insert(ComponentKey::new("xapi"), healthy);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(100),
        )
        .await;

        // The broken queue is abandoned; the healthy one still drains.
        assert_eq!(stats.success, 1);
        assert!(broken_harness.send_log.lock().unwrap().sends.is_empty());
        assert_eq!(healthy_harness.store_log.lock().unwrap().commits, vec![1]);
    }

    #[tokio::test]
    async fn test_batching_disabled_for_every_send() {
        let (engine, harness) = engine_with_backend(true, &["a", "b"], &[], false);
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(100),
        )
        .await;

        let send_log = harness.send_log.lock().unwrap();
        assert_eq!(send_log.sends.len(), 2);
        assert!(send_log.sends.iter().all(|(_, disabled)| *disabled));
    }

    #[tokio::test]
    async fn test_counters_sum_to_total_claimed() {
        let (engine, harness) = engine_with_backend(
            true,
            &["a", "b", "c", "d", "e"],
            &[("b", Outcome::Malformed), ("d", Outcome::Failed)],
            false,
        );
        let mut registry = Registry::new();
        registry.insert(ComponentKey::new("xapi"), engine);

        let stats = run_recovery(
            &mut registry,
            &RecoveryFilter::All,
            &RecoveryOptions::new(2),
        )
        .await;

        let claimed: usize = harness.store_log.lock().unwrap().pulls.iter().sum();
        assert_eq!(stats.total(), claimed as u64);
        assert_eq!(
            stats,
            RecoveryStats {
                success: 3,
                malformed: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(RecoveryFilter::parse("all"), RecoveryFilter::All);
        assert_eq!(
            RecoveryFilter::parse("xapi"),
            RecoveryFilter::Engine(ComponentKey::new("xapi"))
        );
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let options = RecoveryOptions::new(0);
        assert_eq!(options.batch_size, 1);
        assert!(options.delivery.disable_batching);
    }
}
