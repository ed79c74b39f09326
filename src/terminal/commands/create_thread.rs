//! `create-thread [topic]` - generate and publish a thread

use crate::core::error::Result;
use crate::store::cooldown::CooldownGate;
use crate::terminal::params::{ParamSpec, ParamType};
use crate::terminal::registry::{CommandContext, CommandDefinition, CommandHandler, CommandOutput};
use crate::thread::pipeline::ThreadPipeline;
use async_trait::async_trait;
use std::sync::Arc;

pub const NAME: &str = "create-thread";

pub struct CreateThread {
    pipeline: Arc<ThreadPipeline>,
    cooldowns: Arc<dyn CooldownGate>,
}

impl CreateThread {
    pub fn new(pipeline: Arc<ThreadPipeline>, cooldowns: Arc<dyn CooldownGate>) -> Self {
        Self { pipeline, cooldowns }
    }

    pub fn definition(self) -> CommandDefinition {
        CommandDefinition::new(NAME, "Generates and posts a thread", Arc::new(self))
            .param(ParamSpec::optional("topic", ParamType::String))
    }
}

#[async_trait]
impl CommandHandler for CreateThread {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<CommandOutput> {
        let settings = self.pipeline.settings();
        let class = settings.cooldown_class.as_str();

        let cooldown = self.cooldowns.status(class).await?;
        if cooldown.is_active {
            tracing::info!(class, remaining = cooldown.remaining_minutes, "Thread cooldown active");
            return Ok(CommandOutput::failure(format!(
                "Thread cooldown is active. Time remaining: {} minutes",
                cooldown.remaining_minutes
            )));
        }

        let topic = ctx
            .args
            .get_str("topic")
            .unwrap_or(settings.default_topic.as_str())
            .to_string();

        let result = self.pipeline.generate_and_publish(&topic).await;
        let data = serde_json::to_value(&result)?;

        if !result.success {
            return Ok(
                CommandOutput::failure(format!("Error creating thread: {}", result.message))
                    .with_data(data),
            );
        }

        if let Err(e) = self.cooldowns.mark(class).await {
            tracing::warn!(class, error = %e, "Could not start thread cooldown");
        }

        let mut output = String::from("Thread created successfully!");
        if let Some(thread_id) = &result.thread_id {
            output.push_str(&format!("\nThread ID: {}", thread_id));
        }
        if let Some(draft_id) = &result.draft_id {
            output.push_str(&format!("\nDraft: {}", draft_id));
        }
        output.push_str(&format!("\nTweets: {}", result.tweet_ids.len()));
        if let Some(first) = result.first_segment() {
            output.push_str(&format!("\nFirst Tweet: {}", first));
        }

        Ok(CommandOutput::ok(output).with_data(data))
    }
}
