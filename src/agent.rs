//! Process wiring: collaborators in, ready-to-use executor out

use crate::core::config::AgentConfig;
use crate::core::error::Result;
use crate::llm::generator::ContentGenerator;
use crate::platform::SocialPlatform;
use crate::store::{
    CooldownGate, CooldownTracker, DraftStore, InMemoryDraftStore, InMemoryKnowledge,
    InMemoryTranscript, JsonDraftStore, JsonlTranscript, KnowledgeStore, TranscriptLog,
};
use crate::terminal::commands::builtin_registry;
use crate::terminal::executor::CommandExecutor;
use crate::thread::pipeline::ThreadPipeline;
use std::sync::Arc;

/// External capabilities the agent depends on
#[derive(Clone)]
pub struct Collaborators {
    pub platform: Arc<dyn SocialPlatform>,
    pub generator: Arc<dyn ContentGenerator>,
    pub drafts: Arc<dyn DraftStore>,
    pub knowledge: Arc<dyn KnowledgeStore>,
    pub transcript: Arc<dyn TranscriptLog>,
    pub cooldowns: Arc<dyn CooldownGate>,
}

impl Collaborators {
    /// Storage picked from config; platform and generator supplied by caller
    pub fn from_config(
        config: &AgentConfig,
        platform: Arc<dyn SocialPlatform>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Result<Self> {
        let drafts: Arc<dyn DraftStore> = match &config.storage.drafts_dir {
            Some(dir) => Arc::new(JsonDraftStore::open(dir)?),
            None => Arc::new(InMemoryDraftStore::new()),
        };
        let transcript: Arc<dyn TranscriptLog> = match &config.storage.transcript_path {
            Some(path) => Arc::new(JsonlTranscript::new(path)),
            None => Arc::new(InMemoryTranscript::new()),
        };

        Ok(Self {
            platform,
            generator,
            drafts,
            knowledge: Arc::new(InMemoryKnowledge::new()),
            transcript,
            cooldowns: Arc::new(CooldownTracker::from_config(config)),
        })
    }
}

pub struct Agent {
    pub executor: CommandExecutor,
    pub pipeline: Arc<ThreadPipeline>,
    pub collaborators: Collaborators,
}

impl Agent {
    pub fn build(config: &AgentConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let c = &collaborators;
        let pipeline = Arc::new(
            ThreadPipeline::new(
                c.platform.clone(),
                c.drafts.clone(),
                c.generator.clone(),
                c.knowledge.clone(),
                c.transcript.clone(),
                config.thread.clone(),
            )
            .with_history_limit(config.history.recent_limit),
        );

        let registry = builtin_registry(pipeline.clone(), c.cooldowns.clone(), c.drafts.clone())?;
        tracing::info!(commands = registry.len(), "Command registry ready");

        let executor = CommandExecutor::new(Arc::new(registry), c.transcript.clone());

        Ok(Self {
            executor,
            pipeline,
            collaborators,
        })
    }
}
