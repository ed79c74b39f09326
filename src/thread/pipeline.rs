//! Thread publication pipeline
//!
//! Direct content and generated content converge on the same posting
//! sequence:
//! validate -> persist draft -> publishing -> post top -> reply chain ->
//! published | failed
//!
//! Posting is strictly sequential because every reply targets the id of the
//! segment before it. A failed segment stops the run; already-posted
//! segments stay live and their ids stay on the draft.

use crate::core::config::ThreadConfig;
use crate::core::error::{Result, TerminalError};
use crate::core::types::{DraftId, MessageId};
use crate::llm::generator::ContentGenerator;
use crate::platform::{PostRequest, SocialPlatform};
use crate::store::drafts::DraftStore;
use crate::store::knowledge::{KnowledgeStore, MemoryKind};
use crate::store::transcript::{format_history, TranscriptLog};
use crate::thread::draft::{DraftStatus, Segment, ThreadDraft};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one publication attempt
///
/// Failures are ordinary values here; nothing in the pipeline raises.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResult {
    pub success: bool,
    pub message: String,
    /// Set once a draft record exists for this attempt
    pub draft_id: Option<DraftId>,
    pub status: Option<DraftStatus>,
    /// First segment's message id
    pub thread_id: Option<MessageId>,
    pub tweet_ids: Vec<MessageId>,
    pub segments: Vec<Segment>,
}

impl ThreadResult {
    fn rejected(message: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            success: false,
            message: message.into(),
            draft_id: None,
            status: None,
            thread_id: None,
            tweet_ids: Vec::new(),
            segments,
        }
    }

    fn from_draft(draft: &ThreadDraft, message: impl Into<String>) -> Self {
        Self {
            success: draft.status == DraftStatus::Published,
            message: message.into(),
            draft_id: Some(draft.id.clone()),
            status: Some(draft.status),
            thread_id: draft.thread_id().cloned(),
            tweet_ids: draft.message_ids.clone(),
            segments: draft.segments.clone(),
        }
    }

    /// Text of the first segment, if any
    pub fn first_segment(&self) -> Option<&str> {
        self.segments.first().map(|s| s.content.as_str())
    }
}

pub struct ThreadPipeline {
    platform: Arc<dyn SocialPlatform>,
    drafts: Arc<dyn DraftStore>,
    generator: Arc<dyn ContentGenerator>,
    knowledge: Arc<dyn KnowledgeStore>,
    history: Arc<dyn TranscriptLog>,
    settings: ThreadConfig,
    history_limit: usize,
}

impl ThreadPipeline {
    pub fn new(
        platform: Arc<dyn SocialPlatform>,
        drafts: Arc<dyn DraftStore>,
        generator: Arc<dyn ContentGenerator>,
        knowledge: Arc<dyn KnowledgeStore>,
        history: Arc<dyn TranscriptLog>,
        settings: ThreadConfig,
    ) -> Self {
        Self {
            platform,
            drafts,
            generator,
            knowledge,
            history,
            settings,
            history_limit: 20,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn settings(&self) -> &ThreadConfig {
        &self.settings
    }

    /// Direct-content mode: publish caller-supplied segments
    pub async fn publish(&self, segments: Vec<Segment>) -> ThreadResult {
        tracing::info!(segments = segments.len(), "Starting thread pipeline (direct content)");
        self.validate_and_post(segments, None).await
    }

    /// Generate-then-publish mode
    pub async fn generate_and_publish(&self, topic: &str) -> ThreadResult {
        tracing::info!(topic, "Starting thread pipeline (generated content)");

        let context = match self.history.recent(self.history_limit).await {
            Ok(entries) => format_history(&entries),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load terminal history; continuing without it");
                String::new()
            }
        };
        let memories = match self.knowledge.relevant(topic).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load memories; continuing without them");
                String::new()
            }
        };

        let segments = match self
            .generator
            .generate_segments(topic, &context, &memories)
            .await
        {
            Ok(segments) => segments,
            Err(e) => {
                tracing::warn!(error = %e, "Content generation failed");
                return ThreadResult::rejected(
                    format!("Failed to generate thread content: {}", e),
                    Vec::new(),
                );
            }
        };

        if segments.is_empty() {
            return ThreadResult::rejected("content generation produced no segments", Vec::new());
        }

        self.validate_and_post(segments, Some(topic.to_string())).await
    }

    /// Check every segment before anything is persisted or posted
    pub fn validate(&self, segments: &[Segment]) -> std::result::Result<(), String> {
        if segments.is_empty() {
            return Err("thread content is required".into());
        }

        let limit = self.settings.max_segment_chars;
        if let Some((i, seg)) = segments
            .iter()
            .enumerate()
            .find(|(_, s)| s.char_len() > limit)
        {
            return Err(format!(
                "Tweet content exceeds character limit: segment {} has {} characters (max {})",
                i + 1,
                seg.char_len(),
                limit
            ));
        }

        Ok(())
    }

    async fn validate_and_post(&self, segments: Vec<Segment>, topic: Option<String>) -> ThreadResult {
        if let Err(reason) = self.validate(&segments) {
            tracing::warn!(%reason, "Thread rejected before posting");
            return ThreadResult::rejected(reason, segments);
        }

        let mut draft = ThreadDraft::new(segments, topic);
        if let Err(e) = self.drafts.persist_draft(&draft).await {
            tracing::warn!(draft = %draft.id, error = %e, "Could not persist draft; nothing posted");
            return ThreadResult::rejected(format!("Failed to save draft: {}", e), draft.segments);
        }
        tracing::info!(draft = %draft.id, "Draft saved");

        if let Err(e) = self.set_status(&mut draft, DraftStatus::Publishing).await {
            tracing::warn!(draft = %draft.id, error = %e, "Could not mark draft publishing; nothing posted");
            self.finish(&mut draft, DraftStatus::Failed).await;
            return ThreadResult::from_draft(&draft, format!("Failed to start publishing: {}", e));
        }

        match self.post_segments(&mut draft).await {
            Ok(()) => {
                self.finish(&mut draft, DraftStatus::Published).await;
                tracing::info!(
                    draft = %draft.id,
                    thread = ?draft.thread_id().map(|m| m.as_str()),
                    tweets = draft.message_ids.len(),
                    "Thread published"
                );
                ThreadResult::from_draft(&draft, "Thread published successfully")
            }
            Err(e) => {
                tracing::error!(
                    draft = %draft.id,
                    posted = draft.message_ids.len(),
                    total = draft.segments.len(),
                    error = %e,
                    "Thread publication failed"
                );
                self.finish(&mut draft, DraftStatus::Failed).await;
                ThreadResult::from_draft(&draft, e.to_string())
            }
        }
    }

    /// Post segment 0 at top level, then each later segment as a reply to the
    /// one before it. Stops at the first failure.
    async fn post_segments(&self, draft: &mut ThreadDraft) -> Result<()> {
        let total = draft.segments.len();
        let interval = Duration::from_millis(self.settings.post_interval_ms);

        for i in 0..total {
            if i > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            let segment = &draft.segments[i];
            let request = PostRequest {
                text: segment.content.clone(),
                media_urls: segment.media_urls.clone(),
                idempotency_key: format!("{}:{}", draft.id, i),
            };

            let message_id = match draft.message_ids.last().cloned() {
                None => self
                    .within_timeout(self.platform.post_top(&request))
                    .await??
                    .ok_or_else(|| {
                        TerminalError::Platform("Failed to post first tweet: no tweet id returned".into())
                    })?,
                Some(parent) => {
                    let outcome = self
                        .within_timeout(self.platform.post_reply(&parent, &request))
                        .await?;
                    match (outcome.success, outcome.message_id) {
                        (true, Some(id)) => id,
                        _ => {
                            return Err(TerminalError::Platform(format!(
                                "Failed to post reply tweet {}: {}",
                                i + 1,
                                outcome
                                    .failure_message
                                    .unwrap_or_else(|| "no tweet id returned".into())
                            )));
                        }
                    }
                }
            };

            self.record_posted(draft, message_id, i).await?;
            tracing::info!(
                draft = %draft.id,
                "Posted tweet {}/{}",
                i + 1,
                total
            );
        }

        Ok(())
    }

    /// Bookkeeping after one successful post, finished before the next post
    async fn record_posted(&self, draft: &mut ThreadDraft, message_id: MessageId, index: usize) -> Result<()> {
        draft.push_message_id(message_id.clone())?;

        if let Err(e) = self.drafts.record_message_id(&draft.id, &message_id).await {
            tracing::warn!(draft = %draft.id, index, error = %e, "Could not persist message id");
        }

        let text = &draft.segments[index].content;
        if let Err(e) = self.knowledge.remember(MemoryKind::ThreadPost, text).await {
            tracing::warn!(draft = %draft.id, index, error = %e, "Could not add post to memory");
        }

        Ok(())
    }

    async fn set_status(&self, draft: &mut ThreadDraft, status: DraftStatus) -> Result<()> {
        self.drafts.update_status(&draft.id, status).await?;
        draft.transition(status)
    }

    /// Write the terminal status and the collected ids exactly once
    async fn finish(&self, draft: &mut ThreadDraft, status: DraftStatus) {
        if let Err(e) = draft.transition(status) {
            tracing::error!(draft = %draft.id, error = %e, "Refusing terminal transition");
            return;
        }
        if let Err(e) = self.drafts.finalize_draft(draft).await {
            tracing::warn!(draft = %draft.id, %status, error = %e, "Could not persist terminal status");
        }
    }

    async fn within_timeout<T>(&self, fut: impl Future<Output = T>) -> Result<T> {
        match self.settings.post_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), fut)
                .await
                .map_err(|_| TerminalError::Platform(format!("post timed out after {}s", secs))),
            None => Ok(fut.await),
        }
    }
}
