use chrono::Utc;
use rusqlite::params;
use tribute_shared::models::LikeInsert;
use tribute_shared::{DeviceId, StoryId};
use uuid::Uuid;

use crate::database::{encode_ts, Database};
use crate::error::Result;

impl Database {
    /// Record a like. The unique (story_id, user_identifier) index turns a
    /// repeated like from the same device into a no-op.
    pub fn add_like(&self, story_id: &StoryId, device: &DeviceId) -> Result<LikeInsert> {
        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO story_likes (id, story_id, user_identifier, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                story_id.as_str(),
                device.as_str(),
                encode_ts(Utc::now()),
            ],
        )?;

        Ok(if affected > 0 {
            LikeInsert::Created
        } else {
            LikeInsert::AlreadyPresent
        })
    }

    pub fn remove_like(&self, story_id: &StoryId, device: &DeviceId) -> Result<u64> {
        let affected = self.conn().execute(
            "DELETE FROM story_likes WHERE story_id = ?1 AND user_identifier = ?2",
            params![story_id.as_str(), device.as_str()],
        )?;
        Ok(affected as u64)
    }

    pub fn count_likes(&self, story_id: &StoryId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM story_likes WHERE story_id = ?1",
            params![story_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
