//! Public memorial pages: profile lookup, story timeline, galleries and
//! visitor submissions.

use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, Utc};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tribute_shared::backend::{EngagementBackend, MemorialBackend, ObjectStorage};
use tribute_shared::constants::{DEFAULT_PHOTO_ALT, DEFAULT_VIDEO_TITLE};
use tribute_shared::format::story_display_date;
use tribute_shared::models::{Memorial, NewPhoto, NewStory, NewVideo, Photo, Story, Video};
use tribute_shared::BackendError;

use crate::error::{EngagementError, ValidationError};
use crate::flight::bounded;
use crate::identity::random_base36;

const AUTHOR_IMAGE_FOLDER: &str = "authors";
const STORY_IMAGE_FOLDER: &str = "stories";
const PHOTO_PREFIX: &str = "photos";
const FALLBACK_EXTENSION: &str = "bin";

/// Outcome of resolving a slug. A missing or private memorial is
/// `NotFound`, never an empty profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemorialLookup {
    Found(Memorial),
    NotFound,
    Failed,
}

/// A story as the timeline renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryCard {
    pub story: Story,
    pub display_date: String,
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
            _ => FALLBACK_EXTENSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoryDraft {
    pub author: String,
    pub content: String,
    pub story_date: Option<NaiveDate>,
    pub author_image: Option<ImageUpload>,
    pub story_images: Vec<ImageUpload>,
}

#[derive(Debug, Clone)]
pub struct PhotoDraft {
    pub file: ImageUpload,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoDraft {
    pub url: String,
    pub title: Option<String>,
}

/// `<prefix>/<unix millis>-<random>.<ext>`
fn object_path(prefix: &str, file: &ImageUpload) -> String {
    format!(
        "{prefix}/{}-{}.{}",
        Utc::now().timestamp_millis(),
        random_base36(6),
        file.extension()
    )
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Insert `card` after every card with the same or a later story date;
/// undated stories stay at the end.
fn matches_search(memorial: &Memorial, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(&memorial.name)
        || memorial.birth_place.as_deref().is_some_and(hit)
        || memorial.bio.as_deref().is_some_and(hit)
}

pub fn insert_into_timeline(timeline: &mut Vec<StoryCard>, card: StoryCard) {
    let key = Reverse(card.story.story_date);
    let pos = timeline.partition_point(|c| Reverse(c.story.story_date) <= key);
    timeline.insert(pos, card);
}

pub struct MemorialPages {
    memorials: Arc<dyn MemorialBackend>,
    engagement: Arc<dyn EngagementBackend>,
    storage: Arc<dyn ObjectStorage>,
    offset: FixedOffset,
    timeout: Duration,
    cancel: CancellationToken,
}

impl MemorialPages {
    pub fn new(
        memorials: Arc<dyn MemorialBackend>,
        engagement: Arc<dyn EngagementBackend>,
        storage: Arc<dyn ObjectStorage>,
        offset: FixedOffset,
        timeout: Duration,
    ) -> Self {
        Self {
            memorials,
            engagement,
            storage,
            offset,
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn load_memorial(&self, slug: &str) -> MemorialLookup {
        let slug = slug.trim();
        match bounded(
            &self.cancel,
            self.timeout,
            self.memorials.public_memorial_by_slug(slug),
        )
        .await
        {
            Ok(Some(memorial)) => MemorialLookup::Found(memorial),
            Ok(None) => {
                debug!(slug, "Memorial not found");
                MemorialLookup::NotFound
            }
            Err(e) => {
                warn!(slug, error = %e, "Failed to load memorial");
                MemorialLookup::Failed
            }
        }
    }

    /// The timeline with like and comment counts. Counts are queried
    /// concurrently; a failed count shows as 0.
    pub async fn load_stories(&self, memorial: &Memorial) -> Vec<StoryCard> {
        let stories = match bounded(
            &self.cancel,
            self.timeout,
            self.memorials.stories_for_memorial(memorial.id),
        )
        .await
        {
            Ok(stories) => stories,
            Err(e) => {
                warn!(memorial_id = %memorial.id, error = %e, "Failed to load stories");
                return Vec::new();
            }
        };

        join_all(stories.into_iter().map(|story| self.card_with_counts(story))).await
    }

    async fn card_with_counts(&self, story: Story) -> StoryCard {
        let (likes, comments) = tokio::join!(
            bounded(&self.cancel, self.timeout, self.engagement.count_likes(&story.id)),
            bounded(&self.cancel, self.timeout, self.engagement.count_comments(&story.id)),
        );
        let likes = likes.unwrap_or_else(|e| {
            warn!(story_id = %story.id, error = %e, "Failed to count likes");
            0
        });
        let comments = comments.unwrap_or_else(|e| {
            warn!(story_id = %story.id, error = %e, "Failed to count comments");
            0
        });
        self.card(story, likes, comments)
    }

    fn card(&self, story: Story, likes: u64, comments: u64) -> StoryCard {
        StoryCard {
            display_date: story_display_date(&story, self.offset),
            story,
            likes,
            comments,
        }
    }

    async fn upload(&self, path: &str, file: &ImageUpload) -> Result<String, BackendError> {
        bounded(
            &self.cancel,
            self.timeout,
            self.storage
                .upload_object(path, &file.content_type, file.bytes.clone()),
        )
        .await
    }

    /// Upload for a story; a failure is logged and the image dropped.
    async fn upload_story_image(&self, memorial: &Memorial, folder: &str, file: &ImageUpload) -> Option<String> {
        let path = object_path(&format!("{}/{folder}", memorial.id), file);
        match self.upload(&path, file).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(path = %path, error = %e, "Image upload failed, skipping");
                None
            }
        }
    }

    /// Publish a visitor story and place it in `timeline`.
    pub async fn submit_story(
        &self,
        memorial: &Memorial,
        draft: &StoryDraft,
        timeline: &mut Vec<StoryCard>,
    ) -> Result<StoryCard, EngagementError> {
        let author = draft.author.trim();
        if author.is_empty() {
            return Err(ValidationError::MissingAuthor.into());
        }
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(ValidationError::MissingContent.into());
        }

        let author_image = match &draft.author_image {
            Some(file) => {
                self.upload_story_image(memorial, AUTHOR_IMAGE_FOLDER, file)
                    .await
            }
            None => None,
        };

        let mut story_images = Vec::with_capacity(draft.story_images.len());
        for file in &draft.story_images {
            if let Some(url) = self
                .upload_story_image(memorial, STORY_IMAGE_FOLDER, file)
                .await
            {
                story_images.push(url);
            }
        }

        let new_story = NewStory {
            memorial_id: memorial.id,
            author: author.to_string(),
            content: content.to_string(),
            author_image,
            story_images: (!story_images.is_empty()).then_some(story_images),
            story_date: draft.story_date,
        };

        let story = bounded(
            &self.cancel,
            self.timeout,
            self.memorials.insert_story(&new_story),
        )
        .await?;
        info!(memorial_id = %memorial.id, story_id = %story.id, "Story published");

        let card = self.card(story, 0, 0);
        insert_into_timeline(timeline, card.clone());
        Ok(card)
    }

    /// Public memorials, newest first, narrowed by a case-insensitive match
    /// on name, birth place or bio. A blank query lists everything; a
    /// failed fetch lists nothing.
    pub async fn explore(&self, query: &str) -> Vec<Memorial> {
        let memorials = bounded(&self.cancel, self.timeout, self.memorials.public_memorials())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load memorials");
                Vec::new()
            });

        if query.trim().is_empty() {
            return memorials;
        }
        let needle = query.to_lowercase();
        memorials
            .into_iter()
            .filter(|memorial| matches_search(memorial, &needle))
            .collect()
    }

    /// Photo gallery, newest first; empty on failure.
    pub async fn photos(&self, memorial: &Memorial) -> Vec<Photo> {
        bounded(
            &self.cancel,
            self.timeout,
            self.memorials.photos_for_memorial(memorial.id),
        )
        .await
        .unwrap_or_else(|e| {
            warn!(memorial_id = %memorial.id, error = %e, "Failed to load photos");
            Vec::new()
        })
    }

    /// Video gallery, newest first; empty on failure.
    pub async fn videos(&self, memorial: &Memorial) -> Vec<Video> {
        bounded(
            &self.cancel,
            self.timeout,
            self.memorials.videos_for_memorial(memorial.id),
        )
        .await
        .unwrap_or_else(|e| {
            warn!(memorial_id = %memorial.id, error = %e, "Failed to load videos");
            Vec::new()
        })
    }

    /// Upload a photo and add it to the gallery. Unlike story images, a
    /// failed upload fails the whole operation.
    pub async fn add_photo(
        &self,
        memorial: &Memorial,
        draft: &PhotoDraft,
    ) -> Result<Photo, EngagementError> {
        if draft.file.bytes.is_empty() {
            return Err(ValidationError::EmptyPhoto.into());
        }

        let path = object_path(&format!("{PHOTO_PREFIX}/{}", memorial.id), &draft.file);
        let src = self.upload(&path, &draft.file).await?;

        let new_photo = NewPhoto {
            memorial_id: memorial.id,
            src,
            alt: non_blank(draft.alt.as_deref()).unwrap_or_else(|| DEFAULT_PHOTO_ALT.to_string()),
            caption: non_blank(draft.caption.as_deref()),
        };
        let photo = bounded(
            &self.cancel,
            self.timeout,
            self.memorials.insert_photo(&new_photo),
        )
        .await?;

        info!(memorial_id = %memorial.id, photo_id = %photo.id, "Photo added");
        Ok(photo)
    }

    pub async fn add_video(
        &self,
        memorial: &Memorial,
        draft: &VideoDraft,
    ) -> Result<Video, EngagementError> {
        let url = draft.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingVideoUrl.into());
        }

        let new_video = NewVideo {
            memorial_id: memorial.id,
            url: url.to_string(),
            title: non_blank(draft.title.as_deref())
                .unwrap_or_else(|| DEFAULT_VIDEO_TITLE.to_string()),
        };
        let video = bounded(
            &self.cancel,
            self.timeout,
            self.memorials.insert_video(&new_video),
        )
        .await?;

        info!(memorial_id = %memorial.id, video_id = %video.id, "Video added");
        Ok(video)
    }
}
