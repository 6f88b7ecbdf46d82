use chrono::{SubsecRound, Utc};
use rusqlite::params;
use tribute_shared::models::{Comment, NewComment};
use tribute_shared::StoryId;
use uuid::Uuid;

use crate::database::{decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};

impl Database {
    pub fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let stored = Comment {
            id: Uuid::new_v4().to_string(),
            story_id: comment.story_id.clone(),
            author: comment.author.clone(),
            content: comment.content.clone(),
            // Match the stored precision so a re-fetch returns an equal row.
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.conn().execute(
            "INSERT INTO story_comments (id, story_id, author, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                stored.id,
                stored.story_id.as_str(),
                stored.author,
                stored.content,
                encode_ts(stored.created_at),
            ],
        )?;

        Ok(stored)
    }

    /// Comments of a story, oldest first.
    pub fn get_comments_for_story(&self, story_id: &StoryId) -> Result<Vec<Comment>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, story_id, author, content, created_at
             FROM story_comments WHERE story_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(params![story_id.as_str()], |row| {
            let story_str: String = row.get(1)?;
            let ts_str: String = row.get(4)?;
            Ok(Comment {
                id: row.get(0)?,
                story_id: StoryId::new(story_str),
                author: row.get(2)?,
                content: row.get(3)?,
                created_at: decode_ts(4, &ts_str)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn count_comments(&self, story_id: &StoryId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM story_comments WHERE story_id = ?1",
            params![story_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
