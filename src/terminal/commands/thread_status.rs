//! `thread-status <draft_id>` - re-query a draft

use crate::core::error::Result;
use crate::core::types::DraftId;
use crate::store::drafts::DraftStore;
use crate::terminal::params::{ParamSpec, ParamType};
use crate::terminal::registry::{CommandContext, CommandDefinition, CommandHandler, CommandOutput};
use async_trait::async_trait;
use std::sync::Arc;

pub const NAME: &str = "thread-status";

pub struct ThreadStatus {
    drafts: Arc<dyn DraftStore>,
}

impl ThreadStatus {
    pub fn new(drafts: Arc<dyn DraftStore>) -> Self {
        Self { drafts }
    }

    pub fn definition(self) -> CommandDefinition {
        CommandDefinition::new(NAME, "Shows the status of a thread draft", Arc::new(self))
            .param(ParamSpec::required("draft_id", ParamType::String))
    }
}

#[async_trait]
impl CommandHandler for ThreadStatus {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<CommandOutput> {
        let id = DraftId::from(ctx.args.get_str("draft_id").unwrap_or_default());

        let Some(draft) = self.drafts.fetch_draft(&id).await? else {
            return Ok(CommandOutput::failure(format!("Draft not found: {}", id)));
        };

        let ids = if draft.message_ids.is_empty() {
            "none".to_string()
        } else {
            draft
                .message_ids
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut output = format!(
            "Draft {}\nStatus: {}\nPosted: {}/{}\nTweet IDs: {}",
            draft.id,
            draft.status,
            draft.message_ids.len(),
            draft.segments.len(),
            ids
        );
        if let Some(topic) = &draft.topic {
            output.push_str(&format!("\nTopic: {}", topic));
        }

        Ok(CommandOutput::ok(output).with_data(serde_json::to_value(&draft)?))
    }
}
