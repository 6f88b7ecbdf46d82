//! Wiring of stores, backends and components from a [`ClientConfig`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tribute_shared::backend::{EngagementBackend, MemorialBackend, ObjectStorage};
use tribute_shared::kv::KeyValueStore;
use tribute_shared::{DeviceId, StoryId};
use tribute_store::{default_data_dir, Database, LocalObjectStore, SqliteStore};

use crate::comments::CommentThread;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::memorial::MemorialPages;
use crate::reconciler::EngagementReconciler;
use crate::rest::RestBackend;

const DATABASE_FILE: &str = "tribute.db";

/// A ready-to-use client.
///
/// Device identity and the like ledger always live in the local database.
/// Memorial data comes from the REST backend when one is configured and
/// from the same local database otherwise.
pub struct Tribute {
    config: ClientConfig,
    data_dir: PathBuf,
    remote: bool,
    engagement: Arc<dyn EngagementBackend>,
    cancel: CancellationToken,
    reconciler: EngagementReconciler,
    pages: MemorialPages,
}

impl Tribute {
    pub async fn open(config: ClientConfig) -> Result<Self, ClientError> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_path = data_dir.join(DATABASE_FILE);
        info!(path = %db_path.display(), "Opening local database");
        let local = SqliteStore::new(Database::open_at(&db_path)?);

        let engagement: Arc<dyn EngagementBackend>;
        let memorials: Arc<dyn MemorialBackend>;
        let storage: Arc<dyn ObjectStorage>;
        let remote = config.backend_url.is_some();

        match &config.backend_url {
            Some(url) => {
                let rest = Arc::new(RestBackend::new(
                    url,
                    config.backend_key.as_deref().unwrap_or_default(),
                    &config.media_bucket,
                    config.request_timeout,
                )?);
                info!(url = %url, "Using REST backend");
                engagement = rest.clone();
                memorials = rest.clone();
                storage = rest;
            }
            None => {
                let objects =
                    LocalObjectStore::new(data_dir.clone(), &config.media_bucket).await?;
                let backend = Arc::new(local.clone());
                info!("Using local backend");
                engagement = backend.clone();
                memorials = backend;
                storage = Arc::new(objects);
            }
        }

        let cancel = CancellationToken::new();
        let kv: Arc<dyn KeyValueStore> = Arc::new(local);
        let reconciler =
            EngagementReconciler::new(Arc::clone(&engagement), kv, config.request_timeout)
                .with_cancellation(cancel.clone());
        let pages = MemorialPages::new(
            memorials,
            Arc::clone(&engagement),
            storage,
            config.utc_offset(),
            config.request_timeout,
        )
        .with_cancellation(cancel.clone());

        Ok(Self {
            config,
            data_dir,
            remote,
            engagement,
            cancel,
            reconciler,
            pages,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Whether memorial data comes from the REST backend.
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn reconciler(&self) -> &EngagementReconciler {
        &self.reconciler
    }

    pub fn pages(&self) -> &MemorialPages {
        &self.pages
    }

    pub fn comment_thread(&self, story_id: StoryId) -> CommentThread {
        CommentThread::new(
            Arc::clone(&self.engagement),
            story_id,
            self.config.request_timeout,
        )
        .with_cancellation(self.cancel.clone())
    }

    pub fn device_id(&self) -> DeviceId {
        self.reconciler.device_id()
    }

    /// Cancel every outstanding backend call.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
