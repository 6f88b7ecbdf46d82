//! Rows exchanged with the backend.
//!
//! Field names follow the backend's column names so the structs can be
//! decoded straight from REST responses and encoded into insert payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{deserialize_canonical, DeviceId, StoryId};

// ---------------------------------------------------------------------------
// Memorial
// ---------------------------------------------------------------------------

/// Profile of the person being remembered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Memorial {
    pub id: Uuid,
    /// URL-safe unique handle, e.g. `budi-santoso`.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub quote_author: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Things the person loved.
    #[serde(default)]
    pub likes: Option<Vec<String>>,
    #[serde(default)]
    pub dislikes: Option<Vec<String>>,
    /// Only public memorials are visible to visitors.
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    #[serde(deserialize_with = "deserialize_canonical")]
    pub id: String,
    pub memorial_id: Uuid,
    /// Public URL of the image.
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPhoto {
    pub memorial_id: Uuid,
    pub src: String,
    pub alt: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    #[serde(deserialize_with = "deserialize_canonical")]
    pub id: String,
    pub memorial_id: Uuid,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewVideo {
    pub memorial_id: Uuid,
    pub url: String,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

/// A remembrance written by a visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Story {
    pub id: StoryId,
    pub memorial_id: Uuid,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub author_image: Option<String>,
    /// Ordered image URLs, first one is the cover.
    #[serde(default)]
    pub story_images: Option<Vec<String>>,
    /// Date the remembered event happened, as entered by the author.
    #[serde(default)]
    pub story_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `stories`; the backend assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStory {
    pub memorial_id: Uuid,
    pub author: String,
    pub content: String,
    pub author_image: Option<String>,
    pub story_images: Option<Vec<String>>,
    pub story_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

/// One anonymous like. At most one row exists per (story, device).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewLike {
    pub story_id: StoryId,
    pub user_identifier: DeviceId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_canonical")]
    pub id: String,
    pub story_id: StoryId,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComment {
    pub story_id: StoryId,
    pub author: String,
    pub content: String,
}

/// Result of a like insert against a store that enforces one like per
/// (story, device).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeInsert {
    Created,
    AlreadyPresent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rest_story_row() {
        let json = r#"{
            "id": 12,
            "memorial_id": "6a1f0c8e-2b44-4d0e-9a51-7c9e2f3b8d10",
            "author": "Sari",
            "content": "Beliau selalu tersenyum.",
            "author_image": null,
            "story_images": ["https://cdn.example/a.jpg"],
            "story_date": "2019-08-17",
            "created_at": "2024-01-12T07:05:00.123456+00:00"
        }"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.id, StoryId::from(12i64));
        assert_eq!(story.story_date, NaiveDate::from_ymd_opt(2019, 8, 17));
        assert_eq!(story.story_images.unwrap().len(), 1);
    }

    #[test]
    fn decodes_comment_with_numeric_id() {
        let json = r#"{
            "id": 3,
            "story_id": "12",
            "author": "Budi",
            "content": "Terima kasih",
            "created_at": "2024-01-12T07:05:00Z"
        }"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.id, "3");
        assert_eq!(comment.story_id.as_str(), "12");
    }
}
