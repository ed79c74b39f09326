//! Draft persistence
//!
//! Store operations report failure through `Result` instead of panicking or
//! raising, so the pipeline branches explicitly on whether a write landed.

use crate::core::error::{Result, TerminalError};
use crate::core::types::{now_millis, DraftId, MessageId};
use crate::thread::draft::{DraftStatus, ThreadDraft};
use ahash::AHashMap;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Insert a new draft record
    async fn persist_draft(&self, draft: &ThreadDraft) -> Result<()>;

    /// Move a stored draft to `status`; invalid transitions are rejected
    async fn update_status(&self, id: &DraftId, status: DraftStatus) -> Result<()>;

    /// Append the id produced by the next posted segment
    async fn record_message_id(&self, id: &DraftId, message_id: &MessageId) -> Result<()>;

    /// Write a finished attempt: its terminal status and every message id
    /// it collected, replacing whatever ids were recorded along the way
    async fn finalize_draft(&self, draft: &ThreadDraft) -> Result<()>;

    async fn fetch_draft(&self, id: &DraftId) -> Result<Option<ThreadDraft>>;
}

fn not_found(id: &DraftId) -> TerminalError {
    TerminalError::Store(format!("draft not found: {}", id))
}

fn apply_terminal(stored: &mut ThreadDraft, finished: &ThreadDraft) -> Result<()> {
    if !finished.status.is_terminal() {
        return Err(TerminalError::Store(format!(
            "cannot finalize {} while {}",
            finished.id, finished.status
        )));
    }
    stored.transition(finished.status)?;
    stored.message_ids = finished.message_ids.clone();
    Ok(())
}

/// Drafts held in process memory
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: Mutex<AHashMap<DraftId, ThreadDraft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_drafts<T>(
        &self,
        f: impl FnOnce(&mut AHashMap<DraftId, ThreadDraft>) -> Result<T>,
    ) -> Result<T> {
        let mut drafts = self
            .drafts
            .lock()
            .map_err(|e| TerminalError::Store(format!("draft store lock poisoned: {e}")))?;
        f(&mut drafts)
    }

    pub fn len(&self) -> usize {
        self.with_drafts(|d| Ok(d.len())).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn persist_draft(&self, draft: &ThreadDraft) -> Result<()> {
        self.with_drafts(|drafts| {
            if drafts.contains_key(&draft.id) {
                return Err(TerminalError::Store(format!("draft already exists: {}", draft.id)));
            }
            drafts.insert(draft.id.clone(), draft.clone());
            Ok(())
        })
    }

    async fn update_status(&self, id: &DraftId, status: DraftStatus) -> Result<()> {
        self.with_drafts(|drafts| {
            let draft = drafts.get_mut(id).ok_or_else(|| not_found(id))?;
            draft.transition(status)
        })
    }

    async fn record_message_id(&self, id: &DraftId, message_id: &MessageId) -> Result<()> {
        self.with_drafts(|drafts| {
            let draft = drafts.get_mut(id).ok_or_else(|| not_found(id))?;
            draft.push_message_id(message_id.clone())
        })
    }

    async fn finalize_draft(&self, draft: &ThreadDraft) -> Result<()> {
        self.with_drafts(|drafts| {
            let stored = drafts.get_mut(&draft.id).ok_or_else(|| not_found(&draft.id))?;
            apply_terminal(stored, draft)
        })
    }

    async fn fetch_draft(&self, id: &DraftId) -> Result<Option<ThreadDraft>> {
        self.with_drafts(|drafts| Ok(drafts.get(id).cloned()))
    }
}

/// One pretty-printed JSON file per draft under a directory
#[derive(Debug, Clone)]
pub struct JsonDraftStore {
    dir: PathBuf,
}

impl JsonDraftStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &DraftId) -> Result<PathBuf> {
        let valid = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(TerminalError::Store(format!("invalid draft id: {}", id)));
        }
        Ok(self.dir.join(format!("{}.json", id.as_str())))
    }

    async fn read(&self, id: &DraftId) -> Result<Option<ThreadDraft>> {
        let path = self.path_for(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, draft: &ThreadDraft) -> Result<()> {
        let path = self.path_for(&draft.id)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_string_pretty(draft)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn modify(
        &self,
        id: &DraftId,
        f: impl FnOnce(&mut ThreadDraft) -> Result<()> + Send,
    ) -> Result<()> {
        let mut draft = self.read(id).await?.ok_or_else(|| not_found(id))?;
        f(&mut draft)?;
        draft.updated_at = now_millis();
        self.write(&draft).await
    }
}

#[async_trait]
impl DraftStore for JsonDraftStore {
    async fn persist_draft(&self, draft: &ThreadDraft) -> Result<()> {
        if self.read(&draft.id).await?.is_some() {
            return Err(TerminalError::Store(format!("draft already exists: {}", draft.id)));
        }
        self.write(draft).await
    }

    async fn update_status(&self, id: &DraftId, status: DraftStatus) -> Result<()> {
        self.modify(id, |draft| draft.transition(status)).await
    }

    async fn record_message_id(&self, id: &DraftId, message_id: &MessageId) -> Result<()> {
        let message_id = message_id.clone();
        self.modify(id, move |draft| draft.push_message_id(message_id))
            .await
    }

    async fn finalize_draft(&self, draft: &ThreadDraft) -> Result<()> {
        self.modify(&draft.id, |stored| apply_terminal(stored, draft))
            .await
    }

    async fn fetch_draft(&self, id: &DraftId) -> Result<Option<ThreadDraft>> {
        self.read(id).await
    }
}
