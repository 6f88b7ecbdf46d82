//! v001 -- Initial schema creation.
//!
//! Creates the backend tables consumed by the memorial pages plus the
//! device-local `kv_entries` table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Memorials
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS memorials (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    slug          TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    birth_date    TEXT,                       -- YYYY-MM-DD
    death_date    TEXT,
    birth_place   TEXT,
    bio           TEXT,
    quote         TEXT,
    quote_author  TEXT,
    profile_image TEXT,
    cover_image   TEXT,
    likes         TEXT,                       -- JSON array of strings
    dislikes      TEXT,
    is_public     INTEGER NOT NULL DEFAULT 1, -- boolean 0/1
    created_at    TEXT NOT NULL               -- RFC-3339
);

-- ----------------------------------------------------------------
-- Gallery
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS photos (
    id          TEXT PRIMARY KEY NOT NULL,
    memorial_id TEXT NOT NULL,
    src         TEXT NOT NULL,
    alt         TEXT,
    caption     TEXT,
    created_at  TEXT NOT NULL,

    FOREIGN KEY (memorial_id) REFERENCES memorials(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_photos_memorial ON photos(memorial_id, created_at DESC);

CREATE TABLE IF NOT EXISTS videos (
    id          TEXT PRIMARY KEY NOT NULL,
    memorial_id TEXT NOT NULL,
    url         TEXT NOT NULL,
    title       TEXT,
    created_at  TEXT NOT NULL,

    FOREIGN KEY (memorial_id) REFERENCES memorials(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_videos_memorial ON videos(memorial_id, created_at DESC);

-- ----------------------------------------------------------------
-- Stories
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS stories (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    memorial_id  TEXT NOT NULL,
    author       TEXT NOT NULL,
    content      TEXT NOT NULL,
    author_image TEXT,
    story_images TEXT,                        -- JSON array of URLs
    story_date   TEXT,                        -- YYYY-MM-DD
    created_at   TEXT NOT NULL,

    FOREIGN KEY (memorial_id) REFERENCES memorials(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_stories_memorial ON stories(memorial_id, story_date DESC);

-- ----------------------------------------------------------------
-- Engagement
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS story_likes (
    id              TEXT PRIMARY KEY NOT NULL,
    story_id        TEXT NOT NULL,            -- canonical story id
    user_identifier TEXT NOT NULL,            -- device id
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_story_likes_story ON story_likes(story_id);

CREATE TABLE IF NOT EXISTS story_comments (
    id         TEXT PRIMARY KEY NOT NULL,
    story_id   TEXT NOT NULL,
    author     TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_story_comments_story
    ON story_comments(story_id, created_at ASC);

-- ----------------------------------------------------------------
-- Device-local key-value entries
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS kv_entries (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
