//! Client configuration loaded from environment variables.
//!
//! Everything has a default, so the client runs against the local SQLite
//! backend with zero configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use tribute_shared::constants::{DEFAULT_MEDIA_BUCKET, DEFAULT_REQUEST_TIMEOUT_MS};

/// Western Indonesian Time, UTC+7.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the hosted backend. Unset means local SQLite backend.
    /// Env: `TRIBUTE_BACKEND_URL`
    pub backend_url: Option<String>,

    /// Public (anon) API key sent with every REST request.
    /// Env: `TRIBUTE_BACKEND_KEY`
    pub backend_key: Option<String>,

    /// Directory of the local database and local objects.
    /// Env: `TRIBUTE_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Bound on a single backend call.
    /// Env: `TRIBUTE_REQUEST_TIMEOUT_MS`
    /// Default: 10 000 ms
    pub request_timeout: Duration,

    /// Object storage bucket for uploaded images.
    /// Env: `TRIBUTE_MEDIA_BUCKET`
    /// Default: `media`
    pub media_bucket: String,

    /// Offset used to render timestamps, in minutes east of UTC.
    /// Env: `TRIBUTE_UTC_OFFSET_MINUTES`
    /// Default: 420 (WIB)
    pub utc_offset_minutes: i32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            backend_key: None,
            data_dir: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            media_bucket: DEFAULT_MEDIA_BUCKET.to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backend_url", &self.backend_url)
            .field("backend_key", &self.backend_key.as_ref().map(|_| "<redacted>"))
            .field("data_dir", &self.data_dir)
            .field("request_timeout", &self.request_timeout)
            .field("media_bucket", &self.media_bucket)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable
    /// source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        config.backend_url = var("TRIBUTE_BACKEND_URL");
        config.backend_key = var("TRIBUTE_BACKEND_KEY");
        config.data_dir = var("TRIBUTE_DATA_DIR").map(PathBuf::from);

        if let Some(val) = var("TRIBUTE_REQUEST_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.request_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid TRIBUTE_REQUEST_TIMEOUT_MS, using default"
                ),
            }
        }

        if let Some(bucket) = var("TRIBUTE_MEDIA_BUCKET") {
            config.media_bucket = bucket;
        }

        if let Some(val) = var("TRIBUTE_UTC_OFFSET_MINUTES") {
            match val.parse::<i32>() {
                Ok(minutes) if offset_from_minutes(minutes).is_some() => {
                    config.utc_offset_minutes = minutes
                }
                _ => tracing::warn!(
                    value = %val,
                    "Invalid TRIBUTE_UTC_OFFSET_MINUTES, using default"
                ),
            }
        }

        if config.backend_url.is_some() && config.backend_key.is_none() {
            tracing::warn!("TRIBUTE_BACKEND_URL set without TRIBUTE_BACKEND_KEY");
        }

        config
    }

    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}
