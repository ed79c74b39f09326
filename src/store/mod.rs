//! Persistence collaborators: drafts, cooldowns, transcripts and memories
//!
//! Each concern is a trait with an in-memory implementation; drafts and
//! transcripts also have file-backed ones.

pub mod cooldown;
pub mod drafts;
pub mod knowledge;
pub mod transcript;

pub use cooldown::{CooldownGate, CooldownStatus, CooldownTracker};
pub use drafts::{DraftStore, InMemoryDraftStore, JsonDraftStore};
pub use knowledge::{InMemoryKnowledge, KnowledgeStore, MemoryKind};
pub use transcript::{InMemoryTranscript, JsonlTranscript, TranscriptEntry, TranscriptLog};
