//! `help` - list registered commands

use crate::core::error::Result;
use crate::terminal::registry::{CommandContext, CommandDefinition, CommandHandler, CommandOutput};
use async_trait::async_trait;
use std::sync::Arc;

pub const NAME: &str = "help";

pub struct Help;

impl Help {
    pub fn definition() -> CommandDefinition {
        CommandDefinition::new(NAME, "Lists available commands", Arc::new(Help))
    }
}

#[async_trait]
impl CommandHandler for Help {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::ok(ctx.registry.help_text()))
    }
}
