//! Threadline - social posting agent
//!
//! A line-oriented command terminal whose `create-thread` command drives a
//! multi-step thread publication pipeline with persisted, re-queryable
//! progress.

pub mod agent;
pub mod core;
pub mod llm;
pub mod platform;
pub mod store;
pub mod terminal;
pub mod thread;
