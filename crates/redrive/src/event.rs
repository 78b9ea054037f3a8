//! Event types for failure queue records.
//!
//! A failure queue is a directory of NDJSON files written by the delivery
//! pipeline's dead-letter path, one [`FailedEvent`] record per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tracking event.
///
/// Opaque to the recovery engine apart from `name`, which is used for
/// diagnostics. Never mutated during recovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Event name, e.g. `edx.course.enrollment.activated`.
    pub name: String,
    /// Transformed event payload, passed through verbatim.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A record in a delivery backend's failure queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedEvent {
    /// The event that failed delivery.
    pub event: TrackingEvent,
    /// Error message recorded at failure time.
    pub error: String,
    /// Timestamp when the failure was recorded.
    pub timestamp: DateTime<Utc>,
    /// Number of delivery attempts so far.
    #[serde(default)]
    pub retry_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queue_record() {
        let line = r#"{"event":{"name":"edx.ui.lms.link_clicked","data":{"session":"deadbeef"}},"error":"connect timeout","timestamp":"2024-05-01T12:00:00Z","retry_count":2}"#;

        let record: FailedEvent = serde_json::from_str(line).unwrap();
        assert_eq!(record.event.name, "edx.ui.lms.link_clicked");
        assert_eq!(record.event.data["session"], "deadbeef");
        assert_eq!(record.error, "connect timeout");
        assert_eq!(record.retry_count, 2);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let line = r#"{"event":{"name":"minimal"},"error":"boom","timestamp":"2024-05-01T12:00:00Z"}"#;

        let record: FailedEvent = serde_json::from_str(line).unwrap();
        assert_eq!(record.retry_count, 0);
        assert!(record.event.data.is_null());
    }
}
