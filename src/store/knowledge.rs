//! Knowledge and memory storage consumed by content generation

use crate::core::error::{Result, TerminalError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Category a memory was filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    WorldKnowledge,
    SelfKnowledge,
    ThreadPost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub kind: MemoryKind,
    pub text: String,
}

#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Memory text relevant to `topic`, ready to drop into a prompt
    async fn relevant(&self, topic: &str) -> Result<String>;

    async fn remember(&self, kind: MemoryKind, text: &str) -> Result<()>;
}

/// Keyword-matched memories held in process memory
#[derive(Debug)]
pub struct InMemoryKnowledge {
    memories: Mutex<Vec<Memory>>,
    /// Cap on how many memories one lookup returns
    max_results: usize,
}

impl Default for InMemoryKnowledge {
    fn default() -> Self {
        Self {
            memories: Mutex::new(Vec::new()),
            max_results: 10,
        }
    }
}

impl InMemoryKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memories(&self) -> Vec<Memory> {
        self.memories.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

fn keywords(topic: &str) -> Vec<String> {
    topic
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledge {
    async fn relevant(&self, topic: &str) -> Result<String> {
        let memories = self
            .memories
            .lock()
            .map_err(|e| TerminalError::Store(format!("knowledge lock poisoned: {e}")))?;
        let words = keywords(topic);

        let lines: Vec<String> = memories
            .iter()
            .rev()
            .filter(|m| {
                let text = m.text.to_lowercase();
                words.iter().any(|w| text.contains(w.as_str()))
            })
            .take(self.max_results)
            .map(|m| format!("- {}", m.text))
            .collect();

        Ok(lines.join("\n"))
    }

    async fn remember(&self, kind: MemoryKind, text: &str) -> Result<()> {
        self.memories
            .lock()
            .map_err(|e| TerminalError::Store(format!("knowledge lock poisoned: {e}")))?
            .push(Memory {
                kind,
                text: text.to_string(),
            });
        Ok(())
    }
}
