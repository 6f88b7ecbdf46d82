//! Like state of stories as seen by this device.
//!
//! The remote store is the source of truth for counts; the [`LikeLedger`]
//! answers "did this device like it" without a round trip. A toggle mutates
//! the remote row first and only touches local state once the store has
//! confirmed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tribute_shared::backend::EngagementBackend;
use tribute_shared::kv::KeyValueStore;
use tribute_shared::models::{LikeInsert, NewLike};
use tribute_shared::{BackendError, DeviceId, StoryId};

use crate::error::EngagementError;
use crate::flight::{bounded, InFlight};
use crate::identity::DeviceIdentityProvider;
use crate::ledger::LikeLedger;

/// What a story's like button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engagement {
    pub count: u64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled(Engagement),
    /// A toggle for the same story is still outstanding; nothing was sent.
    Busy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoryCounts {
    pub likes: u64,
    pub comments: u64,
}

pub struct EngagementReconciler {
    backend: Arc<dyn EngagementBackend>,
    identity: DeviceIdentityProvider,
    ledger: LikeLedger,
    displayed: Mutex<HashMap<StoryId, u64>>,
    in_flight: InFlight,
    cancel: CancellationToken,
    timeout: Duration,
}

impl EngagementReconciler {
    pub fn new(
        backend: Arc<dyn EngagementBackend>,
        store: Arc<dyn KeyValueStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            identity: DeviceIdentityProvider::new(Arc::clone(&store)),
            ledger: LikeLedger::new(store),
            displayed: Mutex::new(HashMap::new()),
            in_flight: InFlight::new(),
            cancel: CancellationToken::new(),
            timeout,
        }
    }

    /// Tie remote calls to an externally owned token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort every outstanding and future remote call.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn ledger(&self) -> &LikeLedger {
        &self.ledger
    }

    pub fn device_id(&self) -> DeviceId {
        self.identity.device_id()
    }

    pub fn is_liked(&self, story_id: &StoryId) -> bool {
        self.ledger.is_liked(story_id)
    }

    pub fn is_in_flight(&self, story_id: &StoryId) -> bool {
        self.in_flight.is_in_flight(story_id)
    }

    /// Last count shown for `story_id`, if it was ever loaded.
    pub fn displayed_count(&self, story_id: &StoryId) -> Option<u64> {
        let displayed = self.displayed.lock().unwrap_or_else(|e| e.into_inner());
        displayed.get(story_id).copied()
    }

    fn set_displayed(&self, story_id: &StoryId, count: u64) {
        let mut displayed = self.displayed.lock().unwrap_or_else(|e| e.into_inner());
        displayed.insert(story_id.clone(), count);
    }

    /// Remote like count, failing open to 0, plus ledger membership.
    pub async fn load_engagement(&self, story_id: &StoryId) -> Engagement {
        let count = match self.fetch_like_count(story_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(story_id = %story_id, error = %e, "Failed to load like count");
                0
            }
        };
        self.set_displayed(story_id, count);

        Engagement {
            count,
            is_liked: self.ledger.is_liked(story_id),
        }
    }

    /// Re-query both counts, e.g. after the story detail view closes.
    pub async fn refresh(&self, story_id: &StoryId) -> StoryCounts {
        let comments_call = bounded(
            &self.cancel,
            self.timeout,
            self.backend.count_comments(story_id),
        );
        let (likes, comments) = tokio::join!(self.fetch_like_count(story_id), comments_call);

        let likes = likes.unwrap_or_else(|e| {
            warn!(story_id = %story_id, error = %e, "Failed to refresh like count");
            0
        });
        let comments = comments.unwrap_or_else(|e| {
            warn!(story_id = %story_id, error = %e, "Failed to refresh comment count");
            0
        });
        self.set_displayed(story_id, likes);

        StoryCounts { likes, comments }
    }

    /// Flip this device's like on `story_id`.
    ///
    /// Remote failures leave ledger and count untouched and are returned.
    pub async fn toggle_like(&self, story_id: &StoryId) -> Result<ToggleOutcome, EngagementError> {
        let Some(_slot) = self.in_flight.try_acquire(story_id) else {
            debug!(story_id = %story_id, "Toggle already in flight, ignoring");
            return Ok(ToggleOutcome::Busy);
        };

        let device = self.identity.device_id();
        let was_liked = self.ledger.is_liked(story_id);

        // `exact` is false when the store reports the row was already in the
        // target state; the local count can no longer be trusted then.
        let exact = if was_liked {
            let removed = bounded(
                &self.cancel,
                self.timeout,
                self.backend.delete_like(story_id, &device),
            )
            .await?;
            removed > 0
        } else {
            let like = NewLike {
                story_id: story_id.clone(),
                user_identifier: device.clone(),
            };
            let inserted = bounded(&self.cancel, self.timeout, self.backend.insert_like(&like))
                .await?;
            inserted == LikeInsert::Created
        };

        let is_liked = !was_liked;
        let ledger_write = if is_liked {
            self.ledger.mark_liked(story_id)
        } else {
            self.ledger.mark_unliked(story_id)
        };
        if let Err(e) = ledger_write {
            warn!(story_id = %story_id, error = %e, "Failed to persist like ledger");
        }

        let count = self.settle_count(story_id, is_liked, exact).await;
        self.set_displayed(story_id, count);

        info!(story_id = %story_id, is_liked, count, "Like toggled");
        Ok(ToggleOutcome::Toggled(Engagement { count, is_liked }))
    }

    /// Count to show after a confirmed mutation: the known count moved by
    /// one when the mutation changed a row, otherwise a fresh read.
    async fn settle_count(&self, story_id: &StoryId, is_liked: bool, exact: bool) -> u64 {
        let known = self.displayed_count(story_id);
        if exact {
            if let Some(count) = known {
                return if is_liked {
                    count.saturating_add(1)
                } else {
                    count.saturating_sub(1)
                };
            }
        }

        match self.fetch_like_count(story_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(story_id = %story_id, error = %e, "Failed to re-read like count");
                known.unwrap_or(0)
            }
        }
    }

    async fn fetch_like_count(&self, story_id: &StoryId) -> Result<u64, BackendError> {
        bounded(&self.cancel, self.timeout, self.backend.count_likes(story_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribute_shared::constants::LIKED_STORIES_KEY;
    use tribute_shared::MemoryStore;

    use crate::testing::TestBackend;

    struct Harness {
        backend: Arc<TestBackend>,
        store: Arc<dyn KeyValueStore>,
        reconciler: EngagementReconciler,
    }

    fn harness() -> Harness {
        harness_with_timeout(Duration::from_secs(5))
    }

    fn harness_with_timeout(timeout: Duration) -> Harness {
        let backend = Arc::new(TestBackend::new());
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let reconciler = EngagementReconciler::new(
            Arc::clone(&backend) as Arc<dyn EngagementBackend>,
            Arc::clone(&store),
            timeout,
        );
        Harness {
            backend,
            store,
            reconciler,
        }
    }

    fn toggled(outcome: ToggleOutcome) -> Engagement {
        match outcome {
            ToggleOutcome::Toggled(e) => e,
            ToggleOutcome::Busy => panic!("unexpected Busy"),
        }
    }

    #[tokio::test]
    async fn like_from_three_to_four() {
        let h = harness();
        let story = StoryId::from(42i64);
        h.backend.seed_likes(&story, 3);

        let before = h.reconciler.load_engagement(&story).await;
        assert_eq!(before, Engagement { count: 3, is_liked: false });

        let after = toggled(h.reconciler.toggle_like(&story).await.unwrap());
        assert_eq!(after, Engagement { count: 4, is_liked: true });

        let raw = h.store.get(LIKED_STORIES_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"["42"]"#);
        assert_eq!(h.backend.inner.count_likes(&story).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn toggle_flips_and_double_toggle_restores() {
        let h = harness();
        let story = StoryId::from("s-1");
        h.backend.seed_likes(&story, 2);
        let start = h.reconciler.load_engagement(&story).await;

        let once = toggled(h.reconciler.toggle_like(&story).await.unwrap());
        assert_eq!(once.is_liked, !start.is_liked);

        let twice = toggled(h.reconciler.toggle_like(&story).await.unwrap());
        assert_eq!(twice, start);
        assert!(!h.reconciler.is_liked(&story));
        assert_eq!(h.backend.inner.count_likes(&story).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn device_id_created_lazily_on_first_like() {
        let h = harness();
        let story = StoryId::from(1i64);
        h.reconciler.load_engagement(&story).await;
        assert!(h.store.get("deviceId").unwrap().is_none());

        h.reconciler.toggle_like(&story).await.unwrap();
        assert!(h.store.get("deviceId").unwrap().is_some());
    }

    #[tokio::test]
    async fn count_never_goes_below_zero() {
        let h = harness();
        let story = StoryId::from(7i64);
        // Ledger says liked but the remote row is gone.
        h.reconciler.ledger().mark_liked(&story).unwrap();

        let loaded = h.reconciler.load_engagement(&story).await;
        assert_eq!(loaded, Engagement { count: 0, is_liked: true });

        let after = toggled(h.reconciler.toggle_like(&story).await.unwrap());
        assert_eq!(after, Engagement { count: 0, is_liked: false });
    }

    #[tokio::test]
    async fn duplicate_insert_does_not_inflate_count() {
        let h = harness();
        let story = StoryId::from(9i64);
        let device = h.reconciler.device_id();
        h.backend
            .inner
            .insert_like(&NewLike {
                story_id: story.clone(),
                user_identifier: device,
            })
            .await
            .unwrap();

        // The ledger was lost, so the UI believes the story is not liked.
        let loaded = h.reconciler.load_engagement(&story).await;
        assert_eq!(loaded, Engagement { count: 1, is_liked: false });

        let after = toggled(h.reconciler.toggle_like(&story).await.unwrap());
        assert_eq!(after, Engagement { count: 1, is_liked: true });
        assert_eq!(h.backend.inner.count_likes(&story).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_toggles_send_one_mutation() {
        let h = harness();
        let story = StoryId::from(5i64);
        h.backend.set_delay(Duration::from_millis(50));

        let (a, b) = tokio::join!(
            h.reconciler.toggle_like(&story),
            h.reconciler.toggle_like(&story)
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| **o == ToggleOutcome::Busy).count(), 1);
        assert_eq!(h.backend.mutations(), 1);
        assert!(!h.reconciler.is_in_flight(&story));
    }

    #[tokio::test]
    async fn different_stories_toggle_concurrently() {
        let h = harness();
        h.backend.set_delay(Duration::from_millis(20));
        let (a, b) = (StoryId::from(1i64), StoryId::from(2i64));

        let (ra, rb) = tokio::join!(h.reconciler.toggle_like(&a), h.reconciler.toggle_like(&b));
        assert!(toggled(ra.unwrap()).is_liked);
        assert!(toggled(rb.unwrap()).is_liked);
        assert_eq!(h.backend.mutations(), 2);
    }

    #[tokio::test]
    async fn failed_mutation_changes_nothing() {
        let h = harness();
        let story = StoryId::from(3i64);
        h.backend.seed_likes(&story, 1);
        h.reconciler.load_engagement(&story).await;

        h.backend.set_failing(true);
        let err = h.reconciler.toggle_like(&story).await.unwrap_err();
        assert!(matches!(err, EngagementError::Remote(BackendError::Transport(_))));

        assert!(!h.reconciler.is_liked(&story));
        assert_eq!(h.reconciler.displayed_count(&story), Some(1));
        assert!(!h.reconciler.is_in_flight(&story));
    }

    #[tokio::test]
    async fn load_fails_open_to_zero() {
        let h = harness();
        let story = StoryId::from(3i64);
        h.backend.seed_likes(&story, 4);
        h.reconciler.ledger().mark_liked(&story).unwrap();
        h.backend.set_failing(true);

        let loaded = h.reconciler.load_engagement(&story).await;
        assert_eq!(loaded, Engagement { count: 0, is_liked: true });
    }

    #[tokio::test]
    async fn timeout_releases_the_slot() {
        let h = harness_with_timeout(Duration::from_millis(20));
        let story = StoryId::from(11i64);
        h.backend.set_delay(Duration::from_millis(200));

        let err = h.reconciler.toggle_like(&story).await.unwrap_err();
        assert!(matches!(err, EngagementError::Remote(BackendError::Timeout(20))));
        assert!(!h.reconciler.is_in_flight(&story));
        assert!(!h.reconciler.is_liked(&story));

        h.backend.set_delay(Duration::ZERO);
        let after = toggled(h.reconciler.toggle_like(&story).await.unwrap());
        assert!(after.is_liked);
    }

    #[tokio::test]
    async fn shutdown_cancels_remote_calls() {
        let h = harness();
        let story = StoryId::from(12i64);
        h.reconciler.shutdown();

        let err = h.reconciler.toggle_like(&story).await.unwrap_err();
        assert!(matches!(err, EngagementError::Remote(BackendError::Cancelled)));
        assert!(!h.reconciler.is_in_flight(&story));
        assert_eq!(h.backend.mutations(), 0);
    }

    #[tokio::test]
    async fn refresh_reports_both_counts() {
        let h = harness();
        let story = StoryId::from(15i64);
        h.backend.seed_likes(&story, 2);
        h.backend
            .inner
            .insert_comment(&tribute_shared::models::NewComment {
                story_id: story.clone(),
                author: "Sari".to_string(),
                content: "Rindu".to_string(),
            })
            .await
            .unwrap();

        let counts = h.reconciler.refresh(&story).await;
        assert_eq!(counts, StoryCounts { likes: 2, comments: 1 });
        assert_eq!(h.reconciler.displayed_count(&story), Some(2));
    }
}
