//! Doubles for the client tests: the SQLite store plus injectable
//! failures, latency and call counters, and a key-value store with
//! failing reads.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tribute_shared::backend::{EngagementBackend, MemorialBackend, ObjectStorage};
use tribute_shared::error::{BackendError, KvError};
use tribute_shared::kv::{KeyValueStore, MemoryStore};
use tribute_shared::models::{
    Comment, LikeInsert, Memorial, NewComment, NewLike, NewPhoto, NewStory, NewVideo, Photo,
    Story, Video,
};
use tribute_shared::{DeviceId, StoryId};
use tribute_store::{Database, SqliteStore};
use uuid::Uuid;

pub(crate) fn sample_memorial(slug: &str, is_public: bool) -> Memorial {
    Memorial {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        name: "Budi Santoso".to_string(),
        birth_date: None,
        death_date: None,
        birth_place: None,
        bio: None,
        quote: None,
        quote_author: None,
        profile_image: None,
        cover_image: None,
        likes: None,
        dislikes: None,
        is_public,
        created_at: Utc::now().trunc_subsecs(6),
    }
}

pub(crate) struct TestBackend {
    pub(crate) inner: SqliteStore,
    fail: AtomicBool,
    delay_ms: AtomicU64,
    mutations: AtomicUsize,
    comment_lists: AtomicUsize,
}

impl TestBackend {
    pub(crate) fn new() -> Self {
        Self {
            inner: SqliteStore::new(Database::open_in_memory().unwrap()),
            fail: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            mutations: AtomicUsize::new(0),
            comment_lists: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Like inserts and deletes that reached the store.
    pub(crate) fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub(crate) fn comment_lists(&self) -> usize {
        self.comment_lists.load(Ordering::SeqCst)
    }

    /// Like rows from other devices.
    pub(crate) fn seed_likes(&self, story_id: &StoryId, n: usize) {
        self.inner
            .with_db(|db| {
                for i in 0..n {
                    db.add_like(story_id, &DeviceId::new(format!("device_seed_{i}")))?;
                }
                Ok(())
            })
            .unwrap();
    }

    pub(crate) fn seed_memorial(&self, slug: &str, is_public: bool) -> Memorial {
        let memorial = sample_memorial(slug, is_public);
        self.insert_memorial(&memorial);
        memorial
    }

    pub(crate) fn insert_memorial(&self, memorial: &Memorial) {
        self.inner
            .with_db(|db| db.insert_memorial(memorial))
            .unwrap();
    }

    async fn gate(&self) -> Result<(), BackendError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EngagementBackend for TestBackend {
    async fn count_likes(&self, story_id: &StoryId) -> Result<u64, BackendError> {
        self.gate().await?;
        self.inner.count_likes(story_id).await
    }

    async fn insert_like(&self, like: &NewLike) -> Result<LikeInsert, BackendError> {
        self.gate().await?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_like(like).await
    }

    async fn delete_like(&self, story_id: &StoryId, device: &DeviceId) -> Result<u64, BackendError> {
        self.gate().await?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_like(story_id, device).await
    }

    async fn count_comments(&self, story_id: &StoryId) -> Result<u64, BackendError> {
        self.gate().await?;
        self.inner.count_comments(story_id).await
    }

    async fn list_comments(&self, story_id: &StoryId) -> Result<Vec<Comment>, BackendError> {
        self.gate().await?;
        self.comment_lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_comments(story_id).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, BackendError> {
        self.gate().await?;
        self.inner.insert_comment(comment).await
    }
}

#[async_trait]
impl MemorialBackend for TestBackend {
    async fn public_memorials(&self) -> Result<Vec<Memorial>, BackendError> {
        self.gate().await?;
        self.inner.public_memorials().await
    }

    async fn public_memorial_by_slug(&self, slug: &str) -> Result<Option<Memorial>, BackendError> {
        self.gate().await?;
        self.inner.public_memorial_by_slug(slug).await
    }

    async fn stories_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Story>, BackendError> {
        self.gate().await?;
        self.inner.stories_for_memorial(memorial_id).await
    }

    async fn insert_story(&self, story: &NewStory) -> Result<Story, BackendError> {
        self.gate().await?;
        self.inner.insert_story(story).await
    }

    async fn photos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Photo>, BackendError> {
        self.gate().await?;
        self.inner.photos_for_memorial(memorial_id).await
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo, BackendError> {
        self.gate().await?;
        self.inner.insert_photo(photo).await
    }

    async fn videos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Video>, BackendError> {
        self.gate().await?;
        self.inner.videos_for_memorial(memorial_id).await
    }

    async fn insert_video(&self, video: &NewVideo) -> Result<Video, BackendError> {
        self.gate().await?;
        self.inner.insert_video(video).await
    }
}

/// Object storage that records upload paths and can reject them.
#[derive(Default)]
pub(crate) struct RecordingStorage {
    pub(crate) fail: AtomicBool,
    uploads: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub(crate) fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload_object(
        &self,
        path: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Storage("injected upload failure".to_string()));
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(format!("https://cdn.test/media/{path}"))
    }
}

/// Key-value store whose next `n` reads fail; writes always go through.
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    failing_reads: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn fail_next_reads(&self, n: usize) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let failed = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(KvError::Backend("injected read failure".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        self.inner.remove(key)
    }
}
