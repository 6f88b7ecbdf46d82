//! [`SqliteStore`] as a backend: serves the memorial pages and engagement
//! tracker from a local database when no remote backend is configured.

use async_trait::async_trait;
use tribute_shared::backend::{EngagementBackend, MemorialBackend};
use tribute_shared::error::BackendError;
use tribute_shared::models::{
    Comment, LikeInsert, Memorial, NewComment, NewLike, NewPhoto, NewStory, NewVideo, Photo,
    Story, Video,
};
use tribute_shared::{DeviceId, StoryId};
use uuid::Uuid;

use crate::shared::SqliteStore;

type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
impl EngagementBackend for SqliteStore {
    async fn count_likes(&self, story_id: &StoryId) -> BackendResult<u64> {
        Ok(self.with_db(|db| db.count_likes(story_id))?)
    }

    async fn insert_like(&self, like: &NewLike) -> BackendResult<LikeInsert> {
        Ok(self.with_db(|db| db.add_like(&like.story_id, &like.user_identifier))?)
    }

    async fn delete_like(&self, story_id: &StoryId, device: &DeviceId) -> BackendResult<u64> {
        Ok(self.with_db(|db| db.remove_like(story_id, device))?)
    }

    async fn count_comments(&self, story_id: &StoryId) -> BackendResult<u64> {
        Ok(self.with_db(|db| db.count_comments(story_id))?)
    }

    async fn list_comments(&self, story_id: &StoryId) -> BackendResult<Vec<Comment>> {
        Ok(self.with_db(|db| db.get_comments_for_story(story_id))?)
    }

    async fn insert_comment(&self, comment: &NewComment) -> BackendResult<Comment> {
        Ok(self.with_db(|db| db.insert_comment(comment))?)
    }
}

#[async_trait]
impl MemorialBackend for SqliteStore {
    async fn public_memorials(&self) -> BackendResult<Vec<Memorial>> {
        Ok(self.with_db(|db| db.get_public_memorials())?)
    }

    async fn public_memorial_by_slug(&self, slug: &str) -> BackendResult<Option<Memorial>> {
        Ok(self.with_db(|db| db.get_public_memorial_by_slug(slug))?)
    }

    async fn stories_for_memorial(&self, memorial_id: Uuid) -> BackendResult<Vec<Story>> {
        Ok(self.with_db(|db| db.get_stories_for_memorial(memorial_id))?)
    }

    async fn insert_story(&self, story: &NewStory) -> BackendResult<Story> {
        Ok(self.with_db(|db| db.insert_story(story))?)
    }

    async fn photos_for_memorial(&self, memorial_id: Uuid) -> BackendResult<Vec<Photo>> {
        Ok(self.with_db(|db| db.get_photos_for_memorial(memorial_id))?)
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> BackendResult<Photo> {
        Ok(self.with_db(|db| db.insert_photo(photo))?)
    }

    async fn videos_for_memorial(&self, memorial_id: Uuid) -> BackendResult<Vec<Video>> {
        Ok(self.with_db(|db| db.get_videos_for_memorial(memorial_id))?)
    }

    async fn insert_video(&self, video: &NewVideo) -> BackendResult<Video> {
        Ok(self.with_db(|db| db.insert_video(video))?)
    }
}
