//! Thread drafts and their publication lifecycle
//!
//! A draft moves `draft -> publishing -> published | failed` (or straight to
//! `failed` if posting never starts). Terminal statuses never change again.

use crate::core::error::{Result, TerminalError};
use crate::core::types::{now_millis, DraftId, MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// One unit of text destined to become one posted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub content: String,
    #[serde(default)]
    pub media_included: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_urls: Vec<String>,
}

impl Segment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            media_included: false,
            media_urls: Vec::new(),
        }
    }

    /// Length as the platform counts it (unicode scalar values)
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Lifecycle status of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Draft,
    Publishing,
    Published,
    Failed,
}

impl DraftStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DraftStatus::Published | DraftStatus::Failed)
    }

    pub fn can_transition_to(&self, next: DraftStatus) -> bool {
        matches!(
            (self, next),
            (DraftStatus::Draft, DraftStatus::Publishing)
                | (DraftStatus::Draft, DraftStatus::Failed)
                | (DraftStatus::Publishing, DraftStatus::Published)
                | (DraftStatus::Publishing, DraftStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Publishing => "publishing",
            DraftStatus::Published => "published",
            DraftStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted record tracking one thread attempt
///
/// `message_ids` is always a prefix of `segments`: `message_ids[i]` is the
/// platform id produced by posting `segments[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDraft {
    pub id: DraftId,
    pub topic: Option<String>,
    pub segments: Vec<Segment>,
    pub status: DraftStatus,
    pub message_ids: Vec<MessageId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ThreadDraft {
    pub fn new(segments: Vec<Segment>, topic: Option<String>) -> Self {
        let now = now_millis();
        Self {
            id: DraftId::new(),
            topic,
            segments,
            status: DraftStatus::Draft,
            message_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, rejecting anything the lifecycle does not allow
    pub fn transition(&mut self, next: DraftStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(TerminalError::Store(format!(
                "invalid status transition for {}: {} -> {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now_millis();
        Ok(())
    }

    /// Record the id produced by the next unposted segment
    pub fn push_message_id(&mut self, message_id: MessageId) -> Result<()> {
        if self.status != DraftStatus::Publishing {
            return Err(TerminalError::Store(format!(
                "cannot record message ids while {} is {}",
                self.id, self.status
            )));
        }
        if self.message_ids.len() >= self.segments.len() {
            return Err(TerminalError::Store(format!(
                "{} already has an id for every segment",
                self.id
            )));
        }
        self.message_ids.push(message_id);
        self.updated_at = now_millis();
        Ok(())
    }

    /// Overall thread id: the first segment's message id
    pub fn thread_id(&self) -> Option<&MessageId> {
        self.message_ids.first()
    }

    /// Segments that were never posted
    pub fn unposted(&self) -> &[Segment] {
        &self.segments[self.message_ids.len()..]
    }
}
