//! Command definitions and the name-keyed registry
//!
//! The registry is built once at process start and then shared read-only with
//! the executor. There is no removal operation.

use crate::core::error::{Result, TerminalError};
use crate::terminal::params::{BoundArgs, ParamSpec};
use ahash::AHashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a handler hands back to the executor
///
/// `error` is the handler's own business-level verdict (cooldown active,
/// content too long, ...). It is not an exception.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub output: String,
    pub error: bool,
    pub data: Option<serde_json::Value>,
}

impl CommandOutput {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: false,
            data: None,
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: true,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Everything a handler can see during one invocation
pub struct CommandContext<'a> {
    pub args: BoundArgs,
    pub registry: &'a CommandRegistry,
}

/// Behavior behind a registered command
///
/// Returning `Err` is a handler failure; the executor converts it into a
/// transcript line and never lets it escape.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: CommandContext<'_>) -> Result<CommandOutput>;
}

/// A registered command: name, description, parameters and handler
#[derive(Clone)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDefinition {
    pub fn new(name: &str, description: &str, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            handler,
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// One-line usage such as `thread-status <draft_id:string>`
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for spec in &self.params {
            usage.push(' ');
            usage.push_str(&spec.signature());
        }
        usage
    }
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Name-keyed table of available commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    /// Definitions in registration order
    commands: Vec<CommandDefinition>,
    /// Map from exact name to index in `commands`
    by_name: AHashMap<String, usize>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command; empty and duplicate names are rejected
    pub fn register(&mut self, def: CommandDefinition) -> Result<()> {
        if def.name.trim().is_empty() {
            return Err(TerminalError::Registry("command name must not be empty".into()));
        }
        if self.by_name.contains_key(&def.name) {
            return Err(TerminalError::Registry(format!(
                "command already registered: {}",
                def.name
            )));
        }

        self.by_name.insert(def.name.clone(), self.commands.len());
        self.commands.push(def);
        Ok(())
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, name: &str) -> Option<&CommandDefinition> {
        self.by_name.get(name).map(|&i| &self.commands[i])
    }

    /// All commands in registration order
    pub fn list_all(&self) -> &[CommandDefinition] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Help listing synthesized from every registered command
    pub fn help_text(&self) -> String {
        let mut s = String::from("Available commands:\n");
        for def in &self.commands {
            s.push_str(&format!("  {} - {}\n", def.usage(), def.description));
        }
        s.trim_end().to_string()
    }
}
