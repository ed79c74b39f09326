//! Command transcript log
//!
//! Every executed line is paired with its output and appended here. The same
//! log doubles as the short-term terminal history given to content generation.

use crate::core::error::{Result, TerminalError};
use crate::core::types::{now_millis, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub input: String,
    pub output: String,
    pub at: Timestamp,
}

impl TranscriptEntry {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            at: now_millis(),
        }
    }
}

#[async_trait]
pub trait TranscriptLog: Send + Sync {
    async fn append(&self, entry: TranscriptEntry) -> Result<()>;

    /// Up to `limit` most recent entries, oldest first
    async fn recent(&self, limit: usize) -> Result<Vec<TranscriptEntry>>;
}

/// Render entries the way they appeared at the terminal
pub fn format_history(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("$ {}\n{}", e.input, e.output))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Default)]
pub struct InMemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry, oldest first
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TranscriptLog for InMemoryTranscript {
    async fn append(&self, entry: TranscriptEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|e| TerminalError::Store(format!("transcript lock poisoned: {e}")))?
            .push(entry);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TranscriptEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| TerminalError::Store(format!("transcript lock poisoned: {e}")))?;
        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }
}

/// Append-only JSON-lines file
#[derive(Debug, Clone)]
pub struct JsonlTranscript {
    path: PathBuf,
}

impl JsonlTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TranscriptLog for JsonlTranscript {
    async fn append(&self, entry: TranscriptEntry) -> Result<()> {
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<TranscriptEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<TranscriptEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed transcript line"),
            }
        }

        let start = entries.len().saturating_sub(limit);
        Ok(entries.split_off(start))
    }
}
