//! Backend client speaking the hosted service's REST dialect.
//!
//! Tables are served under `/rest/v1/<table>` with PostgREST filters
//! (`column=eq.value`); counts come back in the `Content-Range` header when
//! asked for with `Prefer: count=exact`. Images go to
//! `/storage/v1/object/<bucket>/<path>` and are read back from the public
//! URL of the same object.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tribute_shared::backend::{EngagementBackend, MemorialBackend, ObjectStorage};
use tribute_shared::constants::{
    TABLE_MEMORIALS, TABLE_PHOTOS, TABLE_STORIES, TABLE_STORY_COMMENTS, TABLE_STORY_LIKES,
    TABLE_VIDEOS,
};
use tribute_shared::error::BackendError;
use tribute_shared::models::{
    Comment, LikeInsert, Memorial, NewComment, NewLike, NewPhoto, NewStory, NewVideo, Photo,
    Story, Video,
};
use tribute_shared::{DeviceId, StoryId};
use uuid::Uuid;

const PREFER_COUNT: &str = "count=exact";
const PREFER_RETURN: &str = "return=representation";
const PREFER_IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates,return=representation";
const LIKE_CONFLICT_COLUMNS: &str = "story_id,user_identifier";

type Query = Vec<(&'static str, String)>;

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
/// `*/*` (total unknown) and malformed values give `None`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().split_once('/')?;
    total.parse().ok()
}

pub struct RestBackend {
    http: Client,
    base_url: String,
    api_key: String,
    bucket: String,
    timeout: Duration,
}

impl RestBackend {
    pub fn new(
        base_url: &str,
        api_key: &str,
        bucket: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
            timeout,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }

    /// Public URL of an object in the configured bucket.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout.as_millis() as u64)
        } else {
            BackendError::Transport(e.to_string())
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, BackendError> {
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(&self, resp: Response) -> Result<T, BackendError> {
        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn total_from(resp: &Response) -> Result<u64, BackendError> {
        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BackendError::Decode("missing or invalid Content-Range".to_string()))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        mut query: Query,
    ) -> Result<Vec<T>, BackendError> {
        query.push(("select", "*".to_string()));
        let req = self.request(Method::GET, &self.table_url(table)).query(&query);
        let resp = self.send(req).await?;
        self.decode(resp).await
    }

    async fn count(&self, table: &str, query: Query) -> Result<u64, BackendError> {
        let req = self
            .request(Method::HEAD, &self.table_url(table))
            .query(&query)
            .header("Prefer", PREFER_COUNT);
        let resp = self.send(req).await?;
        Self::total_from(&resp)
    }

    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
        query: Query,
        prefer: &str,
    ) -> Result<Vec<T>, BackendError> {
        let req = self
            .request(Method::POST, &self.table_url(table))
            .query(&query)
            .header("Prefer", prefer)
            .json(&[body]);
        let resp = self.send(req).await?;
        self.decode(resp).await
    }

    async fn insert_one<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        self.insert(table, body, Vec::new(), PREFER_RETURN)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {table} returned no row")))
    }

    async fn delete(&self, table: &str, query: Query) -> Result<u64, BackendError> {
        let req = self
            .request(Method::DELETE, &self.table_url(table))
            .query(&query)
            .header("Prefer", PREFER_COUNT);
        let resp = self.send(req).await?;
        Self::total_from(&resp)
    }
}

#[async_trait]
impl EngagementBackend for RestBackend {
    async fn count_likes(&self, story_id: &StoryId) -> Result<u64, BackendError> {
        self.count(TABLE_STORY_LIKES, vec![("story_id", eq(story_id))])
            .await
    }

    async fn insert_like(&self, like: &NewLike) -> Result<LikeInsert, BackendError> {
        let rows: Vec<serde_json::Value> = self
            .insert(
                TABLE_STORY_LIKES,
                like,
                vec![("on_conflict", LIKE_CONFLICT_COLUMNS.to_string())],
                PREFER_IGNORE_DUPLICATES,
            )
            .await?;

        if rows.is_empty() {
            debug!(story_id = %like.story_id, "Like already present");
            Ok(LikeInsert::AlreadyPresent)
        } else {
            Ok(LikeInsert::Created)
        }
    }

    async fn delete_like(&self, story_id: &StoryId, device: &DeviceId) -> Result<u64, BackendError> {
        self.delete(
            TABLE_STORY_LIKES,
            vec![
                ("story_id", eq(story_id)),
                ("user_identifier", eq(device)),
            ],
        )
        .await
    }

    async fn count_comments(&self, story_id: &StoryId) -> Result<u64, BackendError> {
        self.count(TABLE_STORY_COMMENTS, vec![("story_id", eq(story_id))])
            .await
    }

    async fn list_comments(&self, story_id: &StoryId) -> Result<Vec<Comment>, BackendError> {
        self.select(
            TABLE_STORY_COMMENTS,
            vec![
                ("story_id", eq(story_id)),
                ("order", "created_at.asc,id.asc".to_string()),
            ],
        )
        .await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, BackendError> {
        self.insert_one(TABLE_STORY_COMMENTS, comment).await
    }
}

#[async_trait]
impl MemorialBackend for RestBackend {
    async fn public_memorials(&self) -> Result<Vec<Memorial>, BackendError> {
        self.select(
            TABLE_MEMORIALS,
            vec![
                ("is_public", eq(true)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn public_memorial_by_slug(&self, slug: &str) -> Result<Option<Memorial>, BackendError> {
        let rows: Vec<Memorial> = self
            .select(
                TABLE_MEMORIALS,
                vec![
                    ("slug", eq(slug)),
                    ("is_public", eq(true)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn stories_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Story>, BackendError> {
        self.select(
            TABLE_STORIES,
            vec![
                ("memorial_id", eq(memorial_id)),
                ("order", "story_date.desc.nullslast,id.desc".to_string()),
            ],
        )
        .await
    }

    async fn insert_story(&self, story: &NewStory) -> Result<Story, BackendError> {
        self.insert_one(TABLE_STORIES, story).await
    }

    async fn photos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Photo>, BackendError> {
        self.select(
            TABLE_PHOTOS,
            vec![
                ("memorial_id", eq(memorial_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo, BackendError> {
        self.insert_one(TABLE_PHOTOS, photo).await
    }

    async fn videos_for_memorial(&self, memorial_id: Uuid) -> Result<Vec<Video>, BackendError> {
        self.select(
            TABLE_VIDEOS,
            vec![
                ("memorial_id", eq(memorial_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn insert_video(&self, video: &NewVideo) -> Result<Video, BackendError> {
        self.insert_one(TABLE_VIDEOS, video).await
    }
}

#[async_trait]
impl ObjectStorage for RestBackend {
    async fn upload_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let size = bytes.len();
        let req = self
            .request(Method::POST, &self.object_url(path))
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        self.send(req).await.map_err(|e| match e {
            BackendError::Status { status, message } => {
                BackendError::Storage(format!("upload rejected ({status}): {message}"))
            }
            other => other,
        })?;

        debug!(path, size, "Object uploaded");
        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RestBackend {
        RestBackend::new(
            "https://abc.supabase.co/",
            "anon-key",
            "media",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total(" */12 "), Some(12));
        assert_eq!(parse_content_range_total("*/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let b = backend();
        assert_eq!(
            b.table_url(TABLE_STORY_LIKES),
            "https://abc.supabase.co/rest/v1/story_likes"
        );
        assert_eq!(
            b.object_url("u/stories/1-abc.jpg"),
            "https://abc.supabase.co/storage/v1/object/media/u/stories/1-abc.jpg"
        );
        assert_eq!(
            b.public_url("u/stories/1-abc.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/media/u/stories/1-abc.jpg"
        );
    }

    #[test]
    fn filters_use_eq_operator() {
        assert_eq!(eq(StoryId::from(12i64)), "eq.12");
        assert_eq!(eq(true), "eq.true");
    }

    #[test]
    fn like_payload_matches_columns() {
        let like = NewLike {
            story_id: StoryId::from(3i64),
            user_identifier: DeviceId::new("device_1_abc123"),
        };
        let json = serde_json::to_value([&like]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "story_id": "3", "user_identifier": "device_1_abc123" }])
        );
    }
}
