//! Social platform posting capability
//!
//! Transport to the real network lives outside this crate; implementations
//! plug in behind [`SocialPlatform`].

pub mod dry_run;

pub use dry_run::DryRunPlatform;

use crate::core::error::Result;
use crate::core::types::MessageId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One message to post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
    pub text: String,
    pub media_urls: Vec<String>,
    /// Stable per draft segment (`<draft_id>:<index>`) so a transport that
    /// retries can deduplicate instead of double-posting
    pub idempotency_key: String,
}

/// Outcome of a reply attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyOutcome {
    pub success: bool,
    pub message_id: Option<MessageId>,
    pub failure_message: Option<String>,
}

impl ReplyOutcome {
    pub fn posted(message_id: MessageId) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            failure_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            failure_message: Some(message.into()),
        }
    }
}

#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Post a top-level message; `Ok(None)` means the platform accepted the
    /// call but returned no identifier
    async fn post_top(&self, request: &PostRequest) -> Result<Option<MessageId>>;

    async fn post_reply(&self, parent: &MessageId, request: &PostRequest) -> ReplyOutcome;
}
