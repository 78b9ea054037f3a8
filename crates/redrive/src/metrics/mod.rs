//! Metrics and observability for recovery runs.

pub mod events;

/// Macro for emitting metric events (Vector-style pattern).
///
/// Calls `InternalEvent::emit()` on the given event, which records the
/// corresponding counter metric.
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::metrics::events::InternalEvent::emit($event)
    };
}

pub use emit;
