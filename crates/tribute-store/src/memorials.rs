use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tribute_shared::models::Memorial;
use uuid::Uuid;

use crate::database::{conversion_failure, decode_ts, encode_ts, Database};
use crate::error::Result;

const MEMORIAL_COLUMNS: &str = "id, slug, name, birth_date, death_date, birth_place, bio, quote,
     quote_author, profile_image, cover_image, likes, dislikes, is_public, created_at";

impl Database {
    pub fn insert_memorial(&self, memorial: &Memorial) -> Result<()> {
        let likes = memorial
            .likes
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let dislikes = memorial
            .dislikes
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn().execute(
            &format!(
                "INSERT INTO memorials ({MEMORIAL_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                memorial.id.to_string(),
                memorial.slug,
                memorial.name,
                memorial.birth_date.map(|d| d.to_string()),
                memorial.death_date.map(|d| d.to_string()),
                memorial.birth_place,
                memorial.bio,
                memorial.quote,
                memorial.quote_author,
                memorial.profile_image,
                memorial.cover_image,
                likes,
                dislikes,
                memorial.is_public,
                encode_ts(memorial.created_at),
            ],
        )?;
        Ok(())
    }

    /// Look up a memorial by slug, hiding private ones.
    pub fn get_public_memorial_by_slug(&self, slug: &str) -> Result<Option<Memorial>> {
        let memorial = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {MEMORIAL_COLUMNS} FROM memorials WHERE slug = ?1 AND is_public = 1"
                ),
                params![slug],
                row_to_memorial,
            )
            .optional()?;
        Ok(memorial)
    }

    /// Public memorials, most recently created first.
    pub fn get_public_memorials(&self) -> Result<Vec<Memorial>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MEMORIAL_COLUMNS} FROM memorials
             WHERE is_public = 1
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], row_to_memorial)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn row_to_memorial(row: &rusqlite::Row<'_>) -> rusqlite::Result<Memorial> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_failure(0, e))?;

    let likes: Option<String> = row.get(11)?;
    let dislikes: Option<String> = row.get(12)?;
    let created_str: String = row.get(14)?;

    Ok(Memorial {
        id,
        slug: row.get(1)?,
        name: row.get(2)?,
        birth_date: decode_date(3, row.get(3)?)?,
        death_date: decode_date(4, row.get(4)?)?,
        birth_place: row.get(5)?,
        bio: row.get(6)?,
        quote: row.get(7)?,
        quote_author: row.get(8)?,
        profile_image: row.get(9)?,
        cover_image: row.get(10)?,
        likes: decode_list(11, likes)?,
        dislikes: decode_list(12, dislikes)?,
        is_public: row.get(13)?,
        created_at: decode_ts(14, &created_str)?,
    })
}

pub(crate) fn decode_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| s.parse::<NaiveDate>().map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

pub(crate) fn decode_list(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<Vec<String>>> {
    raw.map(|s| serde_json::from_str(&s).map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn sample_memorial(slug: &str, is_public: bool) -> Memorial {
        Memorial {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: "Budi Santoso".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1950, 3, 1),
            death_date: NaiveDate::from_ymd_opt(2020, 6, 9),
            birth_place: Some("Yogyakarta".to_string()),
            bio: None,
            quote: None,
            quote_author: None,
            profile_image: None,
            cover_image: None,
            likes: Some(vec!["Kopi".to_string(), "Wayang".to_string()]),
            dislikes: None,
            is_public,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn public_lookup_hides_private_rows() {
        let db = Database::open_in_memory().unwrap();
        let public = sample_memorial("budi-santoso", true);
        db.insert_memorial(&public).unwrap();
        db.insert_memorial(&sample_memorial("rahasia", false)).unwrap();

        let found = db.get_public_memorial_by_slug("budi-santoso").unwrap().unwrap();
        assert_eq!(found.id, public.id);
        assert_eq!(found.likes, public.likes);
        assert_eq!(found.birth_date, public.birth_date);

        assert!(db.get_public_memorial_by_slug("rahasia").unwrap().is_none());
        assert!(db.get_public_memorial_by_slug("tidak-ada").unwrap().is_none());
    }

    #[test]
    fn listing_is_public_only_and_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();

        let mut older = sample_memorial("sri-wahyuni", true);
        older.created_at = now - chrono::Duration::days(2);
        let mut newer = sample_memorial("budi-santoso", true);
        newer.created_at = now - chrono::Duration::hours(1);
        let mut hidden = sample_memorial("rahasia", false);
        hidden.created_at = now;

        db.insert_memorial(&older).unwrap();
        db.insert_memorial(&hidden).unwrap();
        db.insert_memorial(&newer).unwrap();

        let slugs: Vec<String> = db
            .get_public_memorials()
            .unwrap()
            .into_iter()
            .map(|m| m.slug)
            .collect();
        assert_eq!(slugs, vec!["budi-santoso", "sri-wahyuni"]);
    }
}
