//! Command execution - turns raw lines into transcripts
//!
//! raw input -> command line -> tokens -> registry lookup -> bound args ->
//! handler -> transcript
//!
//! Nothing raised along the way escapes: every failure becomes a one-line
//! transcript with the error flag set, and every invocation is logged.

use crate::core::error::TerminalError;
use crate::store::transcript::{TranscriptEntry, TranscriptLog};
use crate::terminal::params::bind;
use crate::terminal::registry::{CommandContext, CommandOutput, CommandRegistry};
use crate::terminal::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transcript for input that contains no command
pub const NO_COMMAND_MESSAGE: &str = "Error: No command provided";

/// Result of executing one command line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// The command line as executed
    pub command: String,
    pub output: String,
    pub error: bool,
    /// Structured payload from the handler, if it produced one
    pub data: Option<serde_json::Value>,
}

impl ExecutionResult {
    fn text(command: &str, output: String, error: bool) -> Self {
        Self {
            command: command.to_string(),
            output,
            error,
            data: None,
        }
    }
}

/// Aggregated transcript of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub commands: Vec<String>,
    pub output: String,
}

/// Structured single-command request: `{"command": "..."}`
#[derive(Debug, Deserialize)]
struct CommandRequest {
    /// Absent reads as empty, which is the no-command notice
    #[serde(default)]
    command: String,
}

pub struct CommandExecutor {
    registry: Arc<CommandRegistry>,
    transcript: Arc<dyn TranscriptLog>,
}

impl CommandExecutor {
    pub fn new(registry: Arc<CommandRegistry>, transcript: Arc<dyn TranscriptLog>) -> Self {
        Self { registry, transcript }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Execute one raw input, which is either a command line or a JSON
    /// object carrying a `command` string
    pub async fn execute_one(&self, raw: &str) -> ExecutionResult {
        let line = match extract_command_line(raw) {
            Ok(line) => line,
            Err(e) => {
                let result = ExecutionResult::text(raw, format!("Error parsing command: {}", e), true);
                self.log(&result).await;
                return result;
            }
        };
        let line = line.trim();

        let result = self.run_line(line).await;
        self.log(&result).await;
        result
    }

    /// Execute lines strictly in order; each command sees the side effects
    /// of the ones before it
    pub async fn execute_batch<S: AsRef<str>>(&self, lines: &[S]) -> BatchResult {
        let mut commands = Vec::with_capacity(lines.len());
        let mut sections = Vec::with_capacity(lines.len());

        for line in lines {
            let result = self.execute_one(line.as_ref()).await;
            sections.push(format!("$ {}\n{}", result.command, result.output));
            commands.push(result.command);
        }

        BatchResult {
            commands,
            output: sections.join("\n\n"),
        }
    }

    async fn run_line(&self, line: &str) -> ExecutionResult {
        if line.is_empty() {
            return ExecutionResult::text(line, NO_COMMAND_MESSAGE.to_string(), false);
        }

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                return ExecutionResult::text(line, format!("Error parsing command: {}", e), true);
            }
        };

        let Some((name, arg_tokens)) = tokens.split_first() else {
            return ExecutionResult::text(line, NO_COMMAND_MESSAGE.to_string(), false);
        };

        let Some(def) = self.registry.lookup(name) else {
            tracing::debug!(command = %name, "Unknown command");
            return ExecutionResult::text(
                line,
                TerminalError::UnknownCommand(name.clone()).to_string(),
                true,
            );
        };

        let args = match bind(arg_tokens, &def.params) {
            Ok(args) => args,
            Err(e) => return handler_error(line, name, &e.to_string()),
        };

        tracing::debug!(command = %name, args = args.len(), "Executing command");

        // The handler runs on its own task so a panic is contained and
        // reported like any other handler failure.
        let handler = Arc::clone(&def.handler);
        let registry = Arc::clone(&self.registry);
        let task = tokio::spawn(async move {
            handler
                .handle(CommandContext {
                    args,
                    registry: &registry,
                })
                .await
        });

        match task.await {
            Ok(Ok(CommandOutput { output, error, data })) => ExecutionResult {
                command: line.to_string(),
                output,
                error,
                data,
            },
            Ok(Err(e)) => handler_error(line, name, &e.to_string()),
            Err(join_err) if join_err.is_panic() => handler_error(line, name, "handler panicked"),
            Err(join_err) => handler_error(line, name, &join_err.to_string()),
        }
    }

    async fn log(&self, result: &ExecutionResult) {
        let entry = TranscriptEntry::new(result.command.clone(), result.output.clone());
        if let Err(e) = self.transcript.append(entry).await {
            tracing::warn!(error = %e, "Failed to append transcript entry");
        }
    }
}

fn handler_error(line: &str, name: &str, detail: &str) -> ExecutionResult {
    tracing::warn!(command = %name, %detail, "Command failed");
    ExecutionResult::text(
        line,
        format!("Error executing command '{}': {}", name, detail),
        true,
    )
}

fn extract_command_line(raw: &str) -> Result<String, TerminalError> {
    if raw.trim_start().starts_with('{') {
        let request: CommandRequest = serde_json::from_str(raw)?;
        Ok(request.command)
    } else {
        Ok(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::store::InMemoryTranscript;
    use crate::terminal::params::{ParamSpec, ParamType};
    use crate::terminal::registry::{CommandDefinition, CommandHandler};
    use async_trait::async_trait;

    struct Greet;

    #[async_trait]
    impl CommandHandler for Greet {
        async fn handle(&self, ctx: CommandContext<'_>) -> Result<CommandOutput> {
            let name = ctx.args.get_str("name").unwrap_or("nobody");
            Ok(CommandOutput::ok(format!("hello {name}")))
        }
    }

    struct Explode;

    #[async_trait]
    impl CommandHandler for Explode {
        async fn handle(&self, _ctx: CommandContext<'_>) -> Result<CommandOutput> {
            Err(TerminalError::Handler("boom".into()))
        }
    }

    struct Panic;

    #[async_trait]
    impl CommandHandler for Panic {
        async fn handle(&self, _ctx: CommandContext<'_>) -> Result<CommandOutput> {
            panic!("handler bug");
        }
    }

    fn executor() -> (CommandExecutor, Arc<InMemoryTranscript>) {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandDefinition::new("greet", "Say hello", Arc::new(Greet))
                    .param(ParamSpec::required("name", ParamType::String)),
            )
            .unwrap();
        registry
            .register(CommandDefinition::new("explode", "Always fails", Arc::new(Explode)))
            .unwrap();
        registry
            .register(CommandDefinition::new("panic", "Panics", Arc::new(Panic)))
            .unwrap();

        let transcript = Arc::new(InMemoryTranscript::new());
        (
            CommandExecutor::new(Arc::new(registry), transcript.clone()),
            transcript,
        )
    }

    #[tokio::test]
    async fn test_success_output_is_handler_output() {
        let (exec, _) = executor();
        let result = exec.execute_one("greet \"Ada Lovelace\"").await;
        assert!(!result.error);
        assert_eq!(result.output, "hello Ada Lovelace");
    }

    #[tokio::test]
    async fn test_json_request_is_unwrapped() {
        let (exec, _) = executor();
        let result = exec.execute_one(r#"{"command": "greet bob"}"#).await;
        assert_eq!(result.command, "greet bob");
        assert_eq!(result.output, "hello bob");
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let (exec, transcript) = executor();
        let result = exec.execute_one(r#"{"command": "#).await;
        assert!(result.error);
        assert!(result.output.starts_with("Error parsing command:"));
        assert_eq!(transcript.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_notice_not_error() {
        let (exec, transcript) = executor();
        let result = exec.execute_one("   ").await;
        assert!(!result.error);
        assert_eq!(result.output, NO_COMMAND_MESSAGE);
        assert_eq!(transcript.entries().len(), 1);

        let result = exec.execute_one(r#"{"command": ""}"#).await;
        assert_eq!(result.output, NO_COMMAND_MESSAGE);
    }

    #[tokio::test]
    async fn test_json_request_without_command_is_notice() {
        let (exec, transcript) = executor();
        let result = exec.execute_one("{}").await;
        assert!(!result.error);
        assert_eq!(result.output, NO_COMMAND_MESSAGE);
        assert_eq!(transcript.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_error_is_contained() {
        let (exec, _) = executor();
        let result = exec.execute_one("explode").await;
        assert!(result.error);
        assert_eq!(result.output, "Error executing command 'explode': boom");
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let (exec, _) = executor();
        let result = exec.execute_one("panic").await;
        assert!(result.error);
        assert_eq!(result.output, "Error executing command 'panic': handler panicked");
    }

    #[tokio::test]
    async fn test_missing_parameter_reported() {
        let (exec, _) = executor();
        let result = exec.execute_one("greet").await;
        assert!(result.error);
        assert_eq!(
            result.output,
            "Error executing command 'greet': Missing required parameter: name"
        );
    }

    #[tokio::test]
    async fn test_unbalanced_quotes_reported() {
        let (exec, _) = executor();
        let result = exec.execute_one("greet \"bob").await;
        assert!(result.error);
        assert!(result.output.starts_with("Error parsing command:"));
    }
}
