use chrono::{SubsecRound, Utc};
use rusqlite::params;
use tribute_shared::models::{NewPhoto, NewVideo, Photo, Video};
use uuid::Uuid;

use crate::database::{conversion_failure, decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};

impl Database {
    pub fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        let stored = Photo {
            id: Uuid::new_v4().to_string(),
            memorial_id: photo.memorial_id,
            src: photo.src.clone(),
            alt: Some(photo.alt.clone()),
            caption: photo.caption.clone(),
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.conn().execute(
            "INSERT INTO photos (id, memorial_id, src, alt, caption, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                stored.id,
                stored.memorial_id.to_string(),
                stored.src,
                stored.alt,
                stored.caption,
                encode_ts(stored.created_at),
            ],
        )?;
        Ok(stored)
    }

    /// Photos of a memorial, newest first.
    pub fn get_photos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Photo>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, memorial_id, src, alt, caption, created_at
             FROM photos WHERE memorial_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![memorial_id.to_string()], |row| {
            let memorial_str: String = row.get(1)?;
            let ts_str: String = row.get(5)?;
            Ok(Photo {
                id: row.get(0)?,
                memorial_id: Uuid::parse_str(&memorial_str)
                    .map_err(|e| conversion_failure(1, e))?,
                src: row.get(2)?,
                alt: row.get(3)?,
                caption: row.get(4)?,
                created_at: decode_ts(5, &ts_str)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn insert_video(&self, video: &NewVideo) -> Result<Video> {
        let stored = Video {
            id: Uuid::new_v4().to_string(),
            memorial_id: video.memorial_id,
            url: video.url.clone(),
            title: Some(video.title.clone()),
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.conn().execute(
            "INSERT INTO videos (id, memorial_id, url, title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                stored.id,
                stored.memorial_id.to_string(),
                stored.url,
                stored.title,
                encode_ts(stored.created_at),
            ],
        )?;
        Ok(stored)
    }

    /// Videos of a memorial, newest first.
    pub fn get_videos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Video>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, memorial_id, url, title, created_at
             FROM videos WHERE memorial_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![memorial_id.to_string()], |row| {
            let memorial_str: String = row.get(1)?;
            let ts_str: String = row.get(4)?;
            Ok(Video {
                id: row.get(0)?,
                memorial_id: Uuid::parse_str(&memorial_str)
                    .map_err(|e| conversion_failure(1, e))?,
                url: row.get(2)?,
                title: row.get(3)?,
                created_at: decode_ts(4, &ts_str)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}
