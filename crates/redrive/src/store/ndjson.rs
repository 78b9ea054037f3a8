//! NDJSON failure queue implementation.
//!
//! Reads the queue directories written by the pipeline's dead-letter
//! path: one `*.ndjson` file per run, one failure record per line.
//! Files are consumed in filename order, lines in file order.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tracing::{debug, warn};

use crate::error::{
    CommitBeyondClaimSnafu, QueueReadSnafu, QueueRemoveSnafu, QueueRewriteSnafu, QueueScanSnafu,
    RecordSerializeSnafu, StoreError,
};
use crate::event::FailedEvent;

use super::FailureStore;

struct LoadedFile {
    path: PathBuf,
    entries: VecDeque<FailedEvent>,
}

/// Failure store over a directory of NDJSON queue files.
pub struct NdjsonFailureStore {
    dir: PathBuf,
    scanned: bool,
    pending_files: VecDeque<PathBuf>,
    current: Option<LoadedFile>,
    /// Claimed but not yet committed records, oldest first.
    claimed: VecDeque<(PathBuf, FailedEvent)>,
}

impl NdjsonFailureStore {
    /// Create a store over `dir`.
    ///
    /// The directory is scanned lazily on the first claim, so opening a
    /// backend whose queue does not exist yet is not an error.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scanned: false,
            pending_files: VecDeque::new(),
            current: None,
            claimed: VecDeque::new(),
        }
    }

    fn scan(&mut self) -> Result<(), StoreError> {
        if !self.dir.exists() {
            debug!(
                "Failure queue {} does not exist, nothing pending",
                self.dir.display()
            );
            return Ok(());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)
            .context(QueueScanSnafu {
                dir: self.dir.clone(),
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "ndjson")
            })
            .collect();

        files.sort();
        self.pending_files = files.into();
        Ok(())
    }

    fn read_entries(path: &Path) -> Result<VecDeque<FailedEvent>, StoreError> {
        let contents = fs::read_to_string(path).context(QueueReadSnafu { path })?;

        let mut entries = VecDeque::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(event) => entries.push_back(event),
                Err(e) => warn!(
                    "Skipping corrupt record at {}:{}: {e}",
                    path.display(),
                    idx + 1
                ),
            }
        }
        Ok(entries)
    }
}

impl FailureStore for NdjsonFailureStore {
    fn claim(&mut self, limit: usize) -> Result<Vec<FailedEvent>, StoreError> {
        if !self.scanned {
            self.scan()?;
            self.scanned = true;
        }

        let mut batch = Vec::new();
        while batch.len() < limit {
            if let Some(file) = self.current.as_mut() {
                if let Some(event) = file.entries.pop_front() {
                    self.claimed.push_back((file.path.clone(), event.clone()));
                    batch.push(event);
                }
                if file.entries.is_empty() {
                    self.current = None;
                }
            } else {
                let Some(path) = self.pending_files.pop_front() else {
                    break;
                };
                let entries = Self::read_entries(&path)?;
                if entries.is_empty() {
                    // Nothing claimable; leave the file in place for inspection.
                    continue;
                }
                self.current = Some(LoadedFile { path, entries });
            }
        }
        Ok(batch)
    }

    fn commit(&mut self, count: usize) -> Result<(), StoreError> {
        ensure!(
            count <= self.claimed.len(),
            CommitBeyondClaimSnafu {
                requested: count,
                outstanding: self.claimed.len(),
            }
        );

        let committed: Vec<(PathBuf, FailedEvent)> = self.claimed.drain(..count).collect();

        let mut affected: Vec<PathBuf> = Vec::new();
        for (path, _) in &committed {
            if !affected.contains(path) {
                affected.push(path.clone());
            }
        }

        for path in affected {
            let still_claimed: Vec<&FailedEvent> = self
                .claimed
                .iter()
                .filter(|(p, _)| *p == path)
                .map(|(_, event)| event)
                .collect();
            let unclaimed: Vec<&FailedEvent> = match &self.current {
                Some(file) if file.path == path => file.entries.iter().collect(),
                _ => Vec::new(),
            };

            if still_claimed.is_empty() && unclaimed.is_empty() {
                fs::remove_file(&path).context(QueueRemoveSnafu { path: path.clone() })?;
            } else {
                let mut out = String::new();
                for event in still_claimed.into_iter().chain(unclaimed) {
                    let line = serde_json::to_string(event).context(RecordSerializeSnafu)?;
                    out.push_str(&line);
                    out.push('\n');
                }
                fs::write(&path, out).context(QueueRewriteSnafu { path: path.clone() })?;
            }
        }
        Ok(())
    }
}
