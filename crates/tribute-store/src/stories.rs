use chrono::Utc;
use rusqlite::params;
use tribute_shared::models::{NewStory, Story};
use tribute_shared::StoryId;
use uuid::Uuid;

use crate::database::{conversion_failure, decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::memorials::{decode_date, decode_list};

const STORY_COLUMNS: &str =
    "id, memorial_id, author, content, author_image, story_images, story_date, created_at";

impl Database {
    /// Insert a story and return it with its assigned id and timestamp.
    pub fn insert_story(&self, story: &NewStory) -> Result<Story> {
        let created_at = Utc::now();
        let images = story
            .story_images
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn().execute(
            "INSERT INTO stories (memorial_id, author, content, author_image, story_images, story_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                story.memorial_id.to_string(),
                story.author,
                story.content,
                story.author_image,
                images,
                story.story_date.map(|d| d.to_string()),
                encode_ts(created_at),
            ],
        )?;

        let id = self.conn().last_insert_rowid();
        self.get_story(&StoryId::from(id))
    }

    pub fn get_story(&self, id: &StoryId) -> Result<Story> {
        self.conn()
            .query_row(
                &format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = ?1"),
                params![id.as_str()],
                row_to_story,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Stories of a memorial, most recent story date first and undated
    /// stories last.
    pub fn get_stories_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Story>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {STORY_COLUMNS} FROM stories
             WHERE memorial_id = ?1
             ORDER BY story_date IS NULL, story_date DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![memorial_id.to_string()], row_to_story)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

fn row_to_story(row: &rusqlite::Row<'_>) -> rusqlite::Result<Story> {
    let id: i64 = row.get(0)?;
    let memorial_str: String = row.get(1)?;
    let memorial_id = Uuid::parse_str(&memorial_str).map_err(|e| conversion_failure(1, e))?;
    let created_str: String = row.get(7)?;

    Ok(Story {
        id: StoryId::from(id),
        memorial_id,
        author: row.get(2)?,
        content: row.get(3)?,
        author_image: row.get(4)?,
        story_images: decode_list(5, row.get(5)?)?,
        story_date: decode_date(6, row.get(6)?)?,
        created_at: decode_ts(7, &created_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memorials::tests::sample_memorial;
    use chrono::NaiveDate;

    fn new_story(memorial_id: Uuid, author: &str, date: Option<NaiveDate>) -> NewStory {
        NewStory {
            memorial_id,
            author: author.to_string(),
            content: "Kenangan indah".to_string(),
            author_image: None,
            story_images: Some(vec!["file:///a.jpg".to_string()]),
            story_date: date,
        }
    }

    #[test]
    fn insert_assigns_numeric_id() {
        let db = Database::open_in_memory().unwrap();
        let memorial = sample_memorial("budi", true);
        db.insert_memorial(&memorial).unwrap();

        let story = db.insert_story(&new_story(memorial.id, "Sari", None)).unwrap();
        assert_eq!(story.id, StoryId::from(1i64));
        assert_eq!(story.story_images.as_deref(), Some(&["file:///a.jpg".to_string()][..]));
        assert!(matches!(
            db.get_story(&StoryId::from(99i64)),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn stories_ordered_by_date_desc_undated_last() {
        let db = Database::open_in_memory().unwrap();
        let memorial = sample_memorial("budi", true);
        db.insert_memorial(&memorial).unwrap();

        db.insert_story(&new_story(memorial.id, "undated", None)).unwrap();
        db.insert_story(&new_story(memorial.id, "old", NaiveDate::from_ymd_opt(1990, 1, 1)))
            .unwrap();
        db.insert_story(&new_story(memorial.id, "new", NaiveDate::from_ymd_opt(2015, 5, 5)))
            .unwrap();

        let authors: Vec<String> = db
            .get_stories_for_memorial(memorial.id)
            .unwrap()
            .into_iter()
            .map(|s| s.author)
            .collect();
        assert_eq!(authors, ["new", "old", "undated"]);
    }
}
