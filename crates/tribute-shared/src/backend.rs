//! The seam between the client logic and the backend-as-a-service.
//!
//! The backend owns durability, query execution and object storage; this
//! crate only describes the operations the client consumes. Implementations
//! live in `tribute-store` (SQLite) and `tribute-client` (REST).

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BackendError;
use crate::models::{
    Comment, LikeInsert, Memorial, NewComment, NewLike, NewPhoto, NewStory, NewVideo, Photo,
    Story, Video,
};
use crate::types::{DeviceId, StoryId};

/// Likes and comments attached to stories.
#[async_trait]
pub trait EngagementBackend: Send + Sync {
    /// Number of like rows for a story.
    async fn count_likes(&self, story_id: &StoryId) -> Result<u64, BackendError>;

    /// Insert a like. A second like for the same (story, device) must not
    /// create another row.
    async fn insert_like(&self, like: &NewLike) -> Result<LikeInsert, BackendError>;

    /// Delete the like of `device` on `story_id`, returning the number of
    /// rows removed.
    async fn delete_like(&self, story_id: &StoryId, device: &DeviceId)
        -> Result<u64, BackendError>;

    async fn count_comments(&self, story_id: &StoryId) -> Result<u64, BackendError>;

    /// All comments of a story, oldest first.
    async fn list_comments(&self, story_id: &StoryId) -> Result<Vec<Comment>, BackendError>;

    /// Insert a comment and return the stored row with its server-assigned
    /// id and timestamp.
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, BackendError>;
}

/// Read paths of the public memorial pages plus visitor submissions.
#[async_trait]
pub trait MemorialBackend: Send + Sync {
    /// Every public memorial, most recently created first.
    async fn public_memorials(&self) -> Result<Vec<Memorial>, BackendError>;

    /// The memorial with this slug, if it exists and is public.
    async fn public_memorial_by_slug(&self, slug: &str) -> Result<Option<Memorial>, BackendError>;

    /// Stories of a memorial, newest story date first, undated stories last.
    async fn stories_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Story>, BackendError>;

    async fn insert_story(&self, story: &NewStory) -> Result<Story, BackendError>;

    /// Photos of a memorial, newest first.
    async fn photos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Photo>, BackendError>;

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo, BackendError>;

    /// Videos of a memorial, newest first.
    async fn videos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Video>, BackendError>;

    async fn insert_video(&self, video: &NewVideo) -> Result<Video, BackendError>;
}

/// Object storage for uploaded images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `path` and return the object's public URL.
    async fn upload_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError>;
}
