//! Traits for delivery backends.

use async_trait::async_trait;

use crate::error::SendError;
use crate::event::TrackingEvent;

/// Per-run delivery options forwarded to every send.
///
/// Recovery runs disable outgoing batching so a single poisoned event
/// cannot block delivery of the sibling events pulled alongside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryOptions {
    /// Bypass any batching-before-delivery optimization inside the
    /// backend and deliver each event immediately.
    pub disable_batching: bool,
}

/// Trait for sinks that deliver one tracking event at a time.
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    /// Attempt delivery of a single event.
    ///
    /// Implementations classify permanently-malformed payloads as
    /// [`SendError::Malformed`] and everything else as
    /// [`SendError::Delivery`].
    async fn send(
        &self,
        event: &TrackingEvent,
        options: &DeliveryOptions,
    ) -> Result<(), SendError>;

    /// Flush any buffered outgoing batch.
    ///
    /// A no-op for backends without internal batching, and for recovery
    /// runs, which disable batching up front.
    async fn flush(&self) -> Result<(), SendError> {
        Ok(())
    }
}
