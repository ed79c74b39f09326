//! A platform that logs posts instead of sending them

use crate::core::error::{Result, TerminalError};
use crate::core::types::MessageId;
use crate::platform::{PostRequest, ReplyOutcome, SocialPlatform};
use ahash::AHashMap;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A message the dry-run platform accepted
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub id: MessageId,
    pub parent: Option<MessageId>,
    pub text: String,
}

/// Fabricates sequential ids and remembers what was "posted"
///
/// Requests repeating an idempotency key get the original id back without a
/// second post.
#[derive(Debug)]
pub struct DryRunPlatform {
    next_id: AtomicU64,
    posted: Mutex<Vec<PostedMessage>>,
    by_key: Mutex<AHashMap<String, MessageId>>,
}

impl Default for DryRunPlatform {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            posted: Mutex::new(Vec::new()),
            by_key: Mutex::new(AHashMap::new()),
        }
    }
}

impl DryRunPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn post(&self, parent: Option<&MessageId>, request: &PostRequest) -> Result<MessageId> {
        let mut by_key = self
            .by_key
            .lock()
            .map_err(|e| TerminalError::Platform(format!("dry-run lock poisoned: {e}")))?;
        if let Some(existing) = by_key.get(&request.idempotency_key) {
            tracing::debug!(key = %request.idempotency_key, id = %existing, "Duplicate post suppressed");
            return Ok(existing.clone());
        }

        let id = MessageId(format!("dry_{}", self.next_id.fetch_add(1, Ordering::Relaxed)));
        by_key.insert(request.idempotency_key.clone(), id.clone());

        self.posted
            .lock()
            .map_err(|e| TerminalError::Platform(format!("dry-run lock poisoned: {e}")))?
            .push(PostedMessage {
                id: id.clone(),
                parent: parent.cloned(),
                text: request.text.clone(),
            });

        tracing::info!(
            id = %id,
            parent = ?parent.map(|p| p.as_str()),
            chars = request.text.chars().count(),
            "Dry-run post"
        );
        Ok(id)
    }
}

#[async_trait]
impl SocialPlatform for DryRunPlatform {
    async fn post_top(&self, request: &PostRequest) -> Result<Option<MessageId>> {
        self.post(None, request).map(Some)
    }

    async fn post_reply(&self, parent: &MessageId, request: &PostRequest) -> ReplyOutcome {
        match self.post(Some(parent), request) {
            Ok(id) => ReplyOutcome::posted(id),
            Err(e) => ReplyOutcome::failed(e.to_string()),
        }
    }
}
