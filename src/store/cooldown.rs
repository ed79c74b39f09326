//! Cooldown windows per action class

use crate::core::config::AgentConfig;
use crate::core::error::{Result, TerminalError};
use crate::core::types::{now_millis, Timestamp};
use ahash::AHashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

const MILLIS_PER_MINUTE: u64 = 60_000;

/// Answer from the gate for one action class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub is_active: bool,
    /// Whole minutes left, rounded up; zero when inactive
    pub remaining_minutes: u64,
}

impl CooldownStatus {
    pub fn inactive() -> Self {
        Self {
            is_active: false,
            remaining_minutes: 0,
        }
    }
}

#[async_trait]
pub trait CooldownGate: Send + Sync {
    async fn status(&self, action_class: &str) -> Result<CooldownStatus>;

    /// Record that an action of this class just happened
    async fn mark(&self, action_class: &str) -> Result<()>;
}

/// In-process cooldown tracking
///
/// Classes without a configured window are never throttled.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    /// Window length in minutes per class
    windows: AHashMap<String, u64>,
    /// Last recorded action per class
    last_action: Mutex<AHashMap<String, Timestamp>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let mut tracker = Self::new();
        for (class, minutes) in &config.cooldowns {
            tracker.windows.insert(class.clone(), *minutes);
        }
        tracker
    }

    pub fn with_window(mut self, action_class: &str, minutes: u64) -> Self {
        self.windows.insert(action_class.to_string(), minutes);
        self
    }

    /// Record an action at an explicit time (unix ms)
    pub fn record_at(&self, action_class: &str, at: Timestamp) -> Result<()> {
        let mut last = self
            .last_action
            .lock()
            .map_err(|e| TerminalError::Store(format!("cooldown lock poisoned: {e}")))?;
        last.insert(action_class.to_string(), at);
        Ok(())
    }

    fn status_at(&self, action_class: &str, now: Timestamp) -> Result<CooldownStatus> {
        let Some(&minutes) = self.windows.get(action_class) else {
            return Ok(CooldownStatus::inactive());
        };

        let last = self
            .last_action
            .lock()
            .map_err(|e| TerminalError::Store(format!("cooldown lock poisoned: {e}")))?;
        let Some(&at) = last.get(action_class) else {
            return Ok(CooldownStatus::inactive());
        };

        let window_ms = minutes * MILLIS_PER_MINUTE;
        let elapsed = now.saturating_sub(at);
        if elapsed >= window_ms {
            return Ok(CooldownStatus::inactive());
        }

        let remaining_ms = window_ms - elapsed;
        Ok(CooldownStatus {
            is_active: true,
            remaining_minutes: remaining_ms.div_ceil(MILLIS_PER_MINUTE),
        })
    }
}

#[async_trait]
impl CooldownGate for CooldownTracker {
    async fn status(&self, action_class: &str) -> Result<CooldownStatus> {
        self.status_at(action_class, now_millis())
    }

    async fn mark(&self, action_class: &str) -> Result<()> {
        self.record_at(action_class, now_millis())
    }
}
