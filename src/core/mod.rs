pub mod config;
pub mod error;
pub mod types;

pub use config::AgentConfig;
pub use error::{Result, TerminalError};
