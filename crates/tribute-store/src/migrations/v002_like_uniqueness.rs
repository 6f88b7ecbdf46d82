//! v002 -- One like per (story, device).
//!
//! Collapses duplicate like rows left by earlier clients, keeping the oldest,
//! then adds the composite unique index that makes like inserts idempotent.

use rusqlite::Connection;

const UP_SQL: &str = r#"
DELETE FROM story_likes
WHERE rowid NOT IN (
    SELECT MIN(rowid) FROM story_likes GROUP BY story_id, user_identifier
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_story_likes_unique
    ON story_likes(story_id, user_identifier);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
