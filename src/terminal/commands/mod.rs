//! Built-in commands

pub mod create_thread;
pub mod help;
pub mod thread_status;

pub use create_thread::CreateThread;
pub use help::Help;
pub use thread_status::ThreadStatus;

use crate::core::error::Result;
use crate::store::cooldown::CooldownGate;
use crate::store::drafts::DraftStore;
use crate::terminal::registry::CommandRegistry;
use crate::thread::pipeline::ThreadPipeline;
use std::sync::Arc;

/// Registry holding every built-in command
pub fn builtin_registry(
    pipeline: Arc<ThreadPipeline>,
    cooldowns: Arc<dyn CooldownGate>,
    drafts: Arc<dyn DraftStore>,
) -> Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    registry.register(Help::definition())?;
    registry.register(CreateThread::new(pipeline, cooldowns).definition())?;
    registry.register(ThreadStatus::new(drafts).definition())?;
    Ok(registry)
}
