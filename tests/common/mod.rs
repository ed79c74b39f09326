//! Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use threadline::agent::{Agent, Collaborators};
use threadline::core::config::AgentConfig;
use threadline::core::error::{Result, TerminalError};
use threadline::core::types::MessageId;
use threadline::llm::ContentGenerator;
use threadline::platform::{PostRequest, ReplyOutcome, SocialPlatform};
use threadline::store::{
    CooldownGate, CooldownStatus, InMemoryDraftStore, InMemoryKnowledge, InMemoryTranscript,
};
use threadline::thread::Segment;

/// Platform that posts successfully until a scripted reply index fails
///
/// Segment indices count from 0 for the top-level post.
#[derive(Default)]
pub struct ScriptedPlatform {
    fail_at: Option<usize>,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<(Option<MessageId>, PostRequest)>>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(Option<MessageId>, PostRequest)> {
        self.requests.lock().unwrap().clone()
    }

    fn attempt(&self, parent: Option<&MessageId>, request: &PostRequest) -> Option<MessageId> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((parent.cloned(), request.clone()));
        if self.fail_at == Some(index) {
            None
        } else {
            Some(MessageId(format!("msg_{index}")))
        }
    }
}

#[async_trait]
impl SocialPlatform for ScriptedPlatform {
    async fn post_top(&self, request: &PostRequest) -> Result<Option<MessageId>> {
        Ok(self.attempt(None, request))
    }

    async fn post_reply(&self, parent: &MessageId, request: &PostRequest) -> ReplyOutcome {
        match self.attempt(Some(parent), request) {
            Some(id) => ReplyOutcome::posted(id),
            None => ReplyOutcome::failed("rate limited"),
        }
    }
}

/// Generator returning canned segments and recording what it was given
#[derive(Default)]
pub struct CannedGenerator {
    segments: Vec<Segment>,
    fail: bool,
    pub seen: Mutex<Vec<(String, String, String)>>,
}

impl CannedGenerator {
    pub fn returning(texts: &[&str]) -> Self {
        Self {
            segments: texts.iter().map(|t| Segment::new(*t)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ContentGenerator for CannedGenerator {
    async fn generate_segments(
        &self,
        topic: &str,
        context: &str,
        memories: &str,
    ) -> Result<Vec<Segment>> {
        self.seen
            .lock()
            .unwrap()
            .push((topic.to_string(), context.to_string(), memories.to_string()));
        if self.fail {
            return Err(TerminalError::LlmError("model unavailable".into()));
        }
        Ok(self.segments.clone())
    }
}

/// Cooldown gate with a fixed answer that counts marks
pub struct FixedCooldown {
    status: CooldownStatus,
    pub marks: AtomicUsize,
}

impl FixedCooldown {
    pub fn inactive() -> Self {
        Self {
            status: CooldownStatus::inactive(),
            marks: AtomicUsize::new(0),
        }
    }

    pub fn active(remaining_minutes: u64) -> Self {
        Self {
            status: CooldownStatus {
                is_active: true,
                remaining_minutes,
            },
            marks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CooldownGate for FixedCooldown {
    async fn status(&self, _action_class: &str) -> Result<CooldownStatus> {
        Ok(self.status)
    }

    async fn mark(&self, _action_class: &str) -> Result<()> {
        self.marks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Config with no pause between posts
pub fn fast_config() -> AgentConfig {
    let mut config = AgentConfig::default();
    config.thread.post_interval_ms = 0;
    config
}

/// Handles to the in-memory collaborators behind a test agent
pub struct Harness {
    pub agent: Agent,
    pub platform: Arc<ScriptedPlatform>,
    pub generator: Arc<CannedGenerator>,
    pub drafts: Arc<InMemoryDraftStore>,
    pub transcript: Arc<InMemoryTranscript>,
    pub knowledge: Arc<InMemoryKnowledge>,
    pub cooldowns: Arc<FixedCooldown>,
}

pub fn harness(
    platform: ScriptedPlatform,
    generator: CannedGenerator,
    cooldowns: FixedCooldown,
) -> Harness {
    let platform = Arc::new(platform);
    let generator = Arc::new(generator);
    let drafts = Arc::new(InMemoryDraftStore::new());
    let transcript = Arc::new(InMemoryTranscript::new());
    let knowledge = Arc::new(InMemoryKnowledge::new());
    let cooldowns = Arc::new(cooldowns);

    let collaborators = Collaborators {
        platform: platform.clone(),
        generator: generator.clone(),
        drafts: drafts.clone(),
        knowledge: knowledge.clone(),
        transcript: transcript.clone(),
        cooldowns: cooldowns.clone(),
    };
    let agent = Agent::build(&fast_config(), collaborators).unwrap();

    Harness {
        agent,
        platform,
        generator,
        drafts,
        transcript,
        knowledge,
        cooldowns,
    }
}
