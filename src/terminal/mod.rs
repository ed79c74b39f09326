//! Line-oriented command terminal
//!
//! raw line -> tokenizer -> registry lookup -> parameter binding -> handler
//! -> transcript

pub mod commands;
pub mod executor;
pub mod params;
pub mod registry;
pub mod repl;
pub mod tokenizer;

pub use executor::{BatchResult, CommandExecutor, ExecutionResult, NO_COMMAND_MESSAGE};
pub use params::{BoundArgs, ParamSpec, ParamType, ParamValue};
pub use registry::{CommandContext, CommandDefinition, CommandHandler, CommandOutput, CommandRegistry};
pub use repl::run_repl;
pub use tokenizer::tokenize;
