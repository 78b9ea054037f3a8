//! File delivery backend.
//!
//! Appends delivered events as NDJSON to a local file. Used for local
//! and bench setups where the downstream sink tails a file instead of
//! accepting HTTP traffic.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snafu::prelude::*;
use tokio::sync::Mutex;

use crate::error::{DeliverySnafu, MalformedSnafu, SendError};
use crate::event::TrackingEvent;

use super::traits::{DeliveryBackend, DeliveryOptions};

pub struct FileBackend {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileBackend {
    /// Open the delivery file for appending, creating parent directories
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl DeliveryBackend for FileBackend {
    async fn send(
        &self,
        event: &TrackingEvent,
        _options: &DeliveryOptions,
    ) -> Result<(), SendError> {
        ensure!(
            !event.name.is_empty(),
            MalformedSnafu {
                name: event.name.clone()
            }
        );

        let line = serde_json::to_string(event).map_err(|_| SendError::Malformed {
            name: event.name.clone(),
        })?;

        let mut file = self.file.lock().await;
        writeln!(file, "{line}").map_err(|e| {
            DeliverySnafu {
                message: format!("write to {} failed: {e}", self.path.display()),
            }
            .build()
        })?;
        Ok(())
    }
}
