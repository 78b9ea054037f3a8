//! Internal events for metrics emission.
//!
//! Each event struct represents one classified delivery outcome during a
//! recovery run. Counters are labeled by backend so multi-backend runs
//! stay observable per backend.

use metrics::counter;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// Event emitted when a failed event is successfully redelivered.
pub struct EventRecovered {
    pub backend: String,
}

impl InternalEvent for EventRecovered {
    fn emit(self) {
        trace!(backend = %self.backend, "Event recovered");
        counter!("redrive_events_recovered_total", "backend" => self.backend).increment(1);
    }
}

/// Event emitted when a claimed event turns out to be permanently
/// unsendable.
pub struct EventMalformed {
    pub backend: String,
}

impl InternalEvent for EventMalformed {
    fn emit(self) {
        trace!(backend = %self.backend, "Malformed event skipped");
        counter!("redrive_events_malformed_total", "backend" => self.backend).increment(1);
    }
}

/// Event emitted when a redelivery attempt fails.
pub struct EventDeliveryFailed {
    pub backend: String,
}

impl InternalEvent for EventDeliveryFailed {
    fn emit(self) {
        trace!(backend = %self.backend, "Event delivery failed");
        counter!("redrive_events_failed_total", "backend" => self.backend).increment(1);
    }
}
