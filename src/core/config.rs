//! Agent configuration with documented defaults
//!
//! Every tunable the terminal and the thread pipeline read is collected here.
//! Values come from an optional TOML file and are then overridden by
//! environment variables, so a deployment can run with no file at all.

use crate::core::error::{Result, TerminalError};
use ahash::AHashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration for the agent process
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Display name used in generation prompts
    pub agent_name: String,

    pub thread: ThreadConfig,

    /// Cooldown window length in minutes, keyed by action class
    pub cooldowns: AHashMap<String, u64>,

    pub history: HistoryConfig,

    pub storage: StorageConfig,
}

/// Settings for the thread publication pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Hard character ceiling of the platform
    ///
    /// A single segment above this aborts the whole attempt before any
    /// network call is made.
    pub max_segment_chars: usize,

    /// Fewest segments the content generator may return
    pub min_segments: usize,

    /// Most segments the content generator may return
    pub max_segments: usize,

    /// Topic used when `create-thread` is invoked without one
    pub default_topic: String,

    /// Pause between consecutive posts (milliseconds)
    ///
    /// Keeps a burst of replies from tripping platform rate limits.
    pub post_interval_ms: u64,

    /// Per-call timeout for platform posts (seconds)
    ///
    /// `None` waits indefinitely, matching the historical behavior.
    pub post_timeout_secs: Option<u64>,

    /// Cooldown class checked before a thread is created
    pub cooldown_class: String,
}

/// Settings for the context fed to content generation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of recent transcript entries included as terminal log
    pub recent_limit: usize,
}

/// Where drafts and transcripts are kept
///
/// Absent paths select the in-memory implementations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub drafts_dir: Option<PathBuf>,
    pub transcript_path: Option<PathBuf>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            max_segment_chars: 280,
            min_segments: 2,
            max_segments: 8,
            default_topic: "the latest developments".into(),
            post_interval_ms: 1000,
            post_timeout_secs: None,
            cooldown_class: "thread".into(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { recent_limit: 20 }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        let mut cooldowns = AHashMap::new();
        cooldowns.insert("thread".to_string(), 60);

        Self {
            agent_name: "threadline".into(),
            thread: ThreadConfig::default(),
            cooldowns,
            history: HistoryConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file (if given), then apply environment overrides
    ///
    /// Recognized variables: `AGENT_NAME`, `THREAD_DEFAULT_TOPIC`,
    /// `THREAD_POST_INTERVAL_MS`, `THREADLINE_DRAFTS_DIR`,
    /// `THREADLINE_TRANSCRIPT`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content)?
            }
            None => AgentConfig::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(name) = std::env::var("AGENT_NAME") {
            self.agent_name = name;
        }
        if let Ok(topic) = std::env::var("THREAD_DEFAULT_TOPIC") {
            self.thread.default_topic = topic;
        }
        if let Some(ms) = std::env::var("THREAD_POST_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.thread.post_interval_ms = ms;
        }
        if let Ok(dir) = std::env::var("THREADLINE_DRAFTS_DIR") {
            self.storage.drafts_dir = Some(PathBuf::from(dir));
        }
        if let Ok(path) = std::env::var("THREADLINE_TRANSCRIPT") {
            self.storage.transcript_path = Some(PathBuf::from(path));
        }
    }

    /// Cooldown window for an action class, if one is configured
    pub fn cooldown_minutes(&self, class: &str) -> Option<u64> {
        self.cooldowns.get(class).copied()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let t = &self.thread;

        if t.max_segment_chars == 0 {
            return Err(TerminalError::Config(
                "max_segment_chars must be positive".into(),
            ));
        }

        if t.min_segments == 0 {
            return Err(TerminalError::Config("min_segments must be at least 1".into()));
        }

        if t.min_segments > t.max_segments {
            return Err(TerminalError::Config(format!(
                "min_segments ({}) should be <= max_segments ({})",
                t.min_segments, t.max_segments
            )));
        }

        if t.cooldown_class.trim().is_empty() {
            return Err(TerminalError::Config("cooldown_class must not be empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thread.max_segment_chars, 280);
        assert_eq!(config.cooldown_minutes("thread"), Some(60));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AgentConfig::from_toml_str(
            r#"
            agent_name = "bot"

            [thread]
            post_interval_ms = 0

            [cooldowns]
            thread = 15
            reply = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.agent_name, "bot");
        assert_eq!(config.thread.post_interval_ms, 0);
        assert_eq!(config.thread.max_segments, 8);
        assert_eq!(config.cooldown_minutes("thread"), Some(15));
        assert_eq!(config.cooldown_minutes("reply"), Some(5));
        assert!(config.storage.drafts_dir.is_none());
    }

    #[test]
    fn test_inverted_segment_bounds_rejected() {
        let result = AgentConfig::from_toml_str(
            r#"
            [thread]
            min_segments = 5
            max_segments = 3
            "#,
        );
        assert!(matches!(result, Err(TerminalError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = AgentConfig::from_toml_str("thread = [");
        assert!(matches!(result, Err(TerminalError::TomlError(_))));
    }
}
