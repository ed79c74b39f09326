//! Thread content generation
//!
//! The pipeline only sees [`ContentGenerator`]. The LLM-backed implementation
//! prompts for a JSON thread and enforces the segment-count rule here, at the
//! generation boundary.

use crate::core::config::ThreadConfig;
use crate::core::error::{Result, TerminalError};
use crate::llm::client::LlmClient;
use crate::thread::draft::Segment;
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Ordered segments for a thread about `topic`
    ///
    /// An empty list is a valid (failed) answer; callers must check.
    async fn generate_segments(
        &self,
        topic: &str,
        context: &str,
        memories: &str,
    ) -> Result<Vec<Segment>>;
}

/// Thread shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct GeneratedThread {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    main_points: Vec<String>,
    thread_tweets: Vec<GeneratedTweet>,
}

#[derive(Debug, Deserialize)]
struct GeneratedTweet {
    content: String,
    #[serde(default)]
    media_included: bool,
}

pub struct LlmThreadGenerator {
    client: LlmClient,
    agent_name: String,
    min_segments: usize,
    max_segments: usize,
    /// Soft length target given to the model, below the hard ceiling
    target_chars: usize,
}

impl LlmThreadGenerator {
    pub fn new(client: LlmClient, agent_name: &str, thread: &ThreadConfig) -> Self {
        Self {
            client,
            agent_name: agent_name.to_string(),
            min_segments: thread.min_segments,
            max_segments: thread.max_segments,
            target_chars: thread.max_segment_chars.saturating_sub(30).max(1),
        }
    }

    fn system_prompt(&self, context: &str, memories: &str) -> String {
        format!(
            "You are the thread aspect of {name}. You create engaging and informative threads.\n\
             \n\
             ## SHORT TERM TERMINAL LOG\n\
             === TERMINAL LOG START ===\n{context}\n=== TERMINAL LOG END ===\n\
             \n\
             # POTENTIALLY RELEVANT MEMORIES\n{memories}\n\
             \n\
             # THREAD RULES\n\
             - Between {min} and {max} tweets\n\
             - Each tweet must be under {target} characters\n\
             - First tweet must grab attention\n\
             - Clear narrative structure, consistent tone\n\
             - End with a call-to-action or strong conclusion\n\
             \n\
             # OUTPUT FORMAT (JSON only, no explanation)\n\
             {{\"topic\": \"...\", \"main_points\": [\"...\"], \
             \"thread_tweets\": [{{\"content\": \"...\", \"media_included\": false}}]}}",
            name = self.agent_name,
            context = context,
            memories = memories,
            min = self.min_segments,
            max = self.max_segments,
            target = self.target_chars,
        )
    }

    fn parse_response(&self, response: &str) -> Result<Vec<Segment>> {
        let json = extract_json(response)?;
        let thread: GeneratedThread = serde_json::from_str(json).map_err(|e| {
            TerminalError::LlmError(format!("Failed to parse thread: {} - Response: {}", e, response))
        })?;

        let count = thread.thread_tweets.len();
        if count < self.min_segments || count > self.max_segments {
            return Err(TerminalError::LlmError(format!(
                "expected {}-{} tweets, model produced {}",
                self.min_segments, self.max_segments, count
            )));
        }

        tracing::debug!(
            topic = ?thread.topic,
            tweets = count,
            points = thread.main_points.len(),
            "Thread generated"
        );

        Ok(thread
            .thread_tweets
            .into_iter()
            .map(|t| Segment {
                content: t.content.trim().to_string(),
                media_included: t.media_included,
                media_urls: Vec::new(),
            })
            .collect())
    }
}

#[async_trait]
impl ContentGenerator for LlmThreadGenerator {
    async fn generate_segments(
        &self,
        topic: &str,
        context: &str,
        memories: &str,
    ) -> Result<Vec<Segment>> {
        let system = self.system_prompt(context, memories);
        let user = format!("GENERATE A THREAD ABOUT {}", topic);
        let response = self.client.complete(&system, &user).await?;
        self.parse_response(&response)
    }
}

/// Stand-in used when no LLM is configured; every request fails with `reason`
pub struct DisabledGenerator {
    reason: String,
}

impl DisabledGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn generate_segments(&self, _: &str, _: &str, _: &str) -> Result<Vec<Segment>> {
        Err(TerminalError::LlmError(self.reason.clone()))
    }
}

/// Slice the outermost JSON object out of a model reply
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| TerminalError::LlmError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| TerminalError::LlmError("No closing brace found in response".into()))?;
    Ok(&response[start..=end])
}
