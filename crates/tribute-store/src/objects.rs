//! Filesystem-backed object storage for the local backend.
//!
//! Objects live under `<base>/<bucket>/<path>`; the public URL handed back is
//! a `file://` URL to that location.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};
use tribute_shared::backend::ObjectStorage;
use tribute_shared::error::BackendError;

use crate::error::{Result, StoreError};

/// Join a relative object path onto `base`, rejecting anything that could
/// leave it (absolute paths, `..`, drive prefixes).
fn ensure_within(base: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = base.to_path_buf();
    let mut pushed = false;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(c) => {
                resolved.push(c);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(relative.to_string()));
            }
        }
    }
    if !pushed {
        return Err(StoreError::InvalidPath(relative.to_string()));
    }
    Ok(resolved)
}

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create the store rooted at `<base_path>/<bucket>`.
    pub async fn new(base_path: PathBuf, bucket: &str) -> Result<Self> {
        let root = ensure_within(&base_path, bucket)?;
        fs::create_dir_all(&root).await?;
        let root = root.canonicalize()?;

        info!(path = %root.display(), "Object store initialized");

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn put(&self, path: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = ensure_within(&self.root, path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;

        debug!(path = %target.display(), size = bytes.len(), "Stored object");
        Ok(target)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStore {
    async fn upload_object(
        &self,
        path: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<String, BackendError> {
        let stored = self.put(path, &bytes).await?;
        Ok(format!("file://{}", stored.display()))
    }
}
