//! HTTP delivery backend.
//!
//! Posts events as a JSON array to a configured endpoint. Outside
//! recovery runs events are buffered into outgoing batches; with
//! batching disabled each event is posted on its own, so one rejected
//! event cannot take its neighbors down with it.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use snafu::prelude::*;
use tokio::sync::Mutex;

use crate::error::{DeliverySnafu, MalformedSnafu, SendError};
use crate::event::TrackingEvent;

use super::traits::{DeliveryBackend, DeliveryOptions};

pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    headers: HashMap<String, String>,
    batch_size: usize,
    buffer: Mutex<Vec<serde_json::Value>>,
}

impl HttpBackend {
    /// Create a backend posting to `endpoint`.
    pub fn new(
        endpoint: String,
        headers: HashMap<String, String>,
        batch_size: usize,
        timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            headers,
            batch_size: batch_size.max(1),
            buffer: Mutex::new(Vec::new()),
        })
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<StatusCode, SendError> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| SendError::Delivery {
            message: format!("request to {} failed: {e}", self.endpoint),
        })?;
        Ok(response.status())
    }

    async fn post_batch(&self, batch: Vec<serde_json::Value>) -> Result<(), SendError> {
        let count = batch.len();
        let status = self.post(&serde_json::Value::Array(batch)).await?;
        if status.is_success() {
            Ok(())
        } else {
            // A rejected batch is not attributable to a single event.
            DeliverySnafu {
                message: format!(
                    "{} returned HTTP {status} for a batch of {count} events",
                    self.endpoint
                ),
            }
            .fail()
        }
    }

    /// Map a response status for a single-event post.
    ///
    /// Client errors mean the endpoint rejected the payload itself, which
    /// is permanent for this event. Everything else is transient.
    fn classify_response(endpoint: &str, status: StatusCode, name: &str) -> Result<(), SendError> {
        if status.is_success() {
            Ok(())
        } else if status.is_client_error() {
            MalformedSnafu { name }.fail()
        } else {
            DeliverySnafu {
                message: format!("{endpoint} returned HTTP {status}"),
            }
            .fail()
        }
    }
}

#[async_trait]
impl DeliveryBackend for HttpBackend {
    async fn send(
        &self,
        event: &TrackingEvent,
        options: &DeliveryOptions,
    ) -> Result<(), SendError> {
        ensure!(
            !event.name.is_empty(),
            MalformedSnafu {
                name: event.name.clone()
            }
        );

        let payload = serde_json::json!({
            "name": event.name,
            "data": event.data,
        });

        if options.disable_batching {
            let body = serde_json::Value::Array(vec![payload]);
            let status = self.post(&body).await?;
            return Self::classify_response(&self.endpoint, status, &event.name);
        }

        let full = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(payload);
            (buffer.len() >= self.batch_size).then(|| std::mem::take(&mut *buffer))
        };

        match full {
            Some(batch) => self.post_batch(batch).await,
            None => Ok(()),
        }
    }

    async fn flush(&self) -> Result<(), SendError> {
        let batch = std::mem::take(&mut *self.buffer.lock().await);
        if batch.is_empty() {
            return Ok(());
        }
        self.post_batch(batch).await
    }
}
