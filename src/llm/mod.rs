//! LLM access and thread content generation

pub mod client;
pub mod generator;

pub use client::LlmClient;
pub use generator::{ContentGenerator, DisabledGenerator, LlmThreadGenerator};
