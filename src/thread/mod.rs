//! Thread drafts and the publication pipeline

pub mod draft;
pub mod pipeline;

pub use draft::{DraftStatus, Segment, ThreadDraft};
pub use pipeline::{ThreadPipeline, ThreadResult};
