use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("{0}")]
    Parse(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter '{name}' must be a {expected}.")]
    InvalidType { name: String, expected: &'static str },

    #[error("{0}")]
    Handler(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
