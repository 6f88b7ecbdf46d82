//! Device-local record of which stories this device has liked.
//!
//! The ledger is one JSON array of canonical story ids under
//! [`LIKED_STORIES_KEY`]. Every mutation reads the whole array, edits it and
//! writes it back. Two writers on the same store (two windows, two
//! processes) race under last-write-wins and one of their edits can be
//! lost; the remote store stays authoritative for counts.

use std::sync::Arc;

use tracing::warn;
use tribute_shared::constants::LIKED_STORIES_KEY;
use tribute_shared::error::KvError;
use tribute_shared::kv::KeyValueStore;
use tribute_shared::StoryId;

#[derive(Clone)]
pub struct LikeLedger {
    store: Arc<dyn KeyValueStore>,
}

impl LikeLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All liked story ids, canonicalized and deduplicated.
    ///
    /// Unreadable or corrupt contents read as an empty ledger.
    pub fn liked_stories(&self) -> Vec<StoryId> {
        self.read().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read like ledger");
            Vec::new()
        })
    }

    pub fn is_liked(&self, story_id: &StoryId) -> bool {
        self.liked_stories().contains(story_id)
    }

    /// Fails without writing when the current ledger cannot be read.
    pub fn mark_liked(&self, story_id: &StoryId) -> Result<(), KvError> {
        let mut ids = self.read()?;
        if ids.contains(story_id) {
            return Ok(());
        }
        ids.push(story_id.clone());
        self.write(&ids)
    }

    pub fn mark_unliked(&self, story_id: &StoryId) -> Result<(), KvError> {
        let mut ids = self.read()?;
        ids.retain(|id| id != story_id);
        self.write(&ids)
    }

    /// Store errors propagate; only corrupt JSON reads as empty.
    fn read(&self) -> Result<Vec<StoryId>, KvError> {
        let Some(raw) = self.store.get(LIKED_STORIES_KEY)? else {
            return Ok(Vec::new());
        };

        let parsed: Vec<StoryId> = match serde_json::from_str(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Corrupt like ledger, treating as empty");
                return Ok(Vec::new());
            }
        };

        let mut ids: Vec<StoryId> = Vec::with_capacity(parsed.len());
        for id in parsed {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn write(&self, ids: &[StoryId]) -> Result<(), KvError> {
        let json = serde_json::to_string(ids).map_err(|e| KvError::Backend(e.to_string()))?;
        self.store.set(LIKED_STORIES_KEY, &json)
    }
}
