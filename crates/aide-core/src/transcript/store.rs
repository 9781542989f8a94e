//! Chat log persistence.
//!
//! File format: a single JSON array, e.g.
//! `[{"role":"user","content":"Hello."},{"role":"assistant","content":"Hi!"}]`
//!
//! A log that cannot be read or is not an array is overwritten with `[]`.
//! Malformed transcripts are not recoverable once loaded.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::TranscriptMessage;
use crate::error::Result;
use crate::utils;

const EMPTY_LOG: &str = "[]";

/// JSON-array chat log at a fixed path. Single reader/writer, no locking.
#[derive(Clone, Debug)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new(utils::get_chat_log_path())
    }
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every message from the log.
    ///
    /// - missing file → created with `[]`
    /// - not an array, invalid JSON, or unreadable → overwritten with `[]`
    /// - array entries that are not `{role, content}` → skipped
    pub fn load(&self) -> Vec<TranscriptMessage> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Chat log not found at {}, creating an empty one",
                    self.path.display()
                );
                self.reset_logged();
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read chat log {}: {}. Resetting to empty list.",
                    self.path.display(),
                    e
                );
                self.reset_logged();
                return Vec::new();
            }
        };

        let items = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!(
                    "Chat log {} contains non-list data. Resetting to empty list.",
                    self.path.display()
                );
                self.reset_logged();
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Error decoding chat log {}: {}. Resetting to empty list.",
                    self.path.display(),
                    e
                );
                self.reset_logged();
                return Vec::new();
            }
        };

        let total = items.len();
        let messages: Vec<TranscriptMessage> = items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value(item) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    warn!(index = idx, error = %e, "Skipping malformed chat log entry");
                    None
                }
            })
            .collect();

        debug!(
            "Loaded {} of {} chat log entries from {}",
            messages.len(),
            total,
            self.path.display()
        );
        messages
    }

    /// Overwrite the log with `messages`.
    pub fn save(&self, messages: &[TranscriptMessage]) -> Result<()> {
        self.ensure_parent()?;
        let json = serde_json::to_string_pretty(messages)?;
        std::fs::write(&self.path, json)?;
        debug!(
            "Saved {} chat log entries to {}",
            messages.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append one message (load → push → save).
    pub fn append(&self, message: TranscriptMessage) -> Result<()> {
        let mut messages = self.load();
        messages.push(message);
        self.save(&messages)
    }

    /// Overwrite the log with an empty array.
    pub fn reset(&self) -> Result<()> {
        self.ensure_parent()?;
        std::fs::write(&self.path, EMPTY_LOG)?;
        Ok(())
    }

    fn reset_logged(&self) {
        if let Err(e) = self.reset() {
            warn!("Failed to reset chat log {}: {}", self.path.display(), e);
        }
    }

    fn ensure_parent(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
