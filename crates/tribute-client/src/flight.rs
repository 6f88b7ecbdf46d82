//! Per-story single-flight guard and bounded remote calls.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tribute_shared::error::BackendError;
use tribute_shared::StoryId;

/// Set of stories with a mutation outstanding.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<StoryId>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `story_id`, or `None` when another caller holds it.
    ///
    /// The claim lasts as long as the returned slot.
    pub fn try_acquire(&self, story_id: &StoryId) -> Option<InFlightSlot> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(story_id.clone()) {
            return None;
        }
        Some(InFlightSlot {
            keys: Arc::clone(&self.keys),
            story_id: story_id.clone(),
        })
    }

    pub fn is_in_flight(&self, story_id: &StoryId) -> bool {
        let keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.contains(story_id)
    }
}

/// Releases its story on drop, whether the operation finished, failed or
/// was abandoned mid-await.
#[derive(Debug)]
pub struct InFlightSlot {
    keys: Arc<Mutex<HashSet<StoryId>>>,
    story_id: StoryId,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.story_id);
    }
}

/// Run a backend call under a cancellation token and a deadline.
pub async fn bounded<T, F>(
    cancel: &CancellationToken,
    timeout: Duration,
    call: F,
) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BackendError::Cancelled),
        res = tokio::time::timeout(timeout, call) => match res {
            Ok(inner) => inner,
            Err(_) => Err(BackendError::Timeout(timeout.as_millis() as u64)),
        },
    }
}
