//! Comment thread of one story.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tribute_shared::backend::EngagementBackend;
use tribute_shared::models::{Comment, NewComment};
use tribute_shared::StoryId;

use crate::error::{EngagementError, ValidationError};
use crate::flight::bounded;

/// Unsent comment input, kept across failed submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub author: String,
    pub content: String,
}

impl CommentDraft {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    fn validate(&self) -> Result<(String, String), ValidationError> {
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::MissingAuthor);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::MissingContent);
        }
        Ok((author.to_string(), content.to_string()))
    }
}

pub struct CommentThread {
    backend: Arc<dyn EngagementBackend>,
    story_id: StoryId,
    comments: Vec<Comment>,
    draft: CommentDraft,
    load_failed: bool,
    cancel: CancellationToken,
    timeout: Duration,
}

impl CommentThread {
    pub fn new(backend: Arc<dyn EngagementBackend>, story_id: StoryId, timeout: Duration) -> Self {
        Self {
            backend,
            story_id,
            comments: Vec::new(),
            draft: CommentDraft::default(),
            load_failed: false,
            cancel: CancellationToken::new(),
            timeout,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn story_id(&self) -> &StoryId {
        &self.story_id
    }

    /// Comments in display order, oldest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Whether the last [`load`](Self::load) failed; the list is empty then.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn draft(&self) -> &CommentDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut CommentDraft {
        &mut self.draft
    }

    /// Fetch the thread. Calling it again is the retry path.
    pub async fn load(&mut self) {
        match bounded(
            &self.cancel,
            self.timeout,
            self.backend.list_comments(&self.story_id),
        )
        .await
        {
            Ok(comments) => {
                self.comments = comments;
                self.load_failed = false;
            }
            Err(e) => {
                warn!(story_id = %self.story_id, error = %e, "Failed to load comments");
                self.comments.clear();
                self.load_failed = true;
            }
        }
    }

    /// Send the current draft.
    ///
    /// On success the stored row is appended locally and the draft cleared;
    /// on any error the list and the draft are left as they were.
    pub async fn submit(&mut self) -> Result<Comment, EngagementError> {
        let (author, content) = self.draft.validate()?;
        let new_comment = NewComment {
            story_id: self.story_id.clone(),
            author,
            content,
        };

        let comment = bounded(
            &self.cancel,
            self.timeout,
            self.backend.insert_comment(&new_comment),
        )
        .await?;

        info!(story_id = %self.story_id, comment_id = %comment.id, "Comment posted");
        self.comments.push(comment.clone());
        self.draft = CommentDraft::default();
        Ok(comment)
    }

    /// Replace the draft with `author`/`content` and send it.
    pub async fn submit_comment(
        &mut self,
        author: &str,
        content: &str,
    ) -> Result<Comment, EngagementError> {
        self.draft = CommentDraft::new(author, content);
        self.submit().await
    }
}
