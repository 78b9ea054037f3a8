//! Failure queue storage.
//!
//! Each delivery backend has a durable queue of previously-failed events.
//! The recovery engine pulls bounded batches through [`FailureStore`] and
//! acknowledges them once processed.

mod ndjson;

pub use ndjson::NdjsonFailureStore;

use crate::error::StoreError;
use crate::event::FailedEvent;

/// Durable per-backend queue of events that previously failed delivery.
///
/// Claiming does not remove events; [`FailureStore::commit`] does. A run
/// that dies between the two re-surfaces the whole in-flight batch on the
/// next run, so recovery is at-least-once rather than silently lossy.
pub trait FailureStore: Send {
    /// Return up to `limit` pending events in queue order.
    ///
    /// An empty batch means nothing is pending at this moment. Must not
    /// block indefinitely.
    fn claim(&mut self, limit: usize) -> Result<Vec<FailedEvent>, StoreError>;

    /// Durably remove the `count` oldest claimed events.
    fn commit(&mut self, count: usize) -> Result<(), StoreError>;
}
