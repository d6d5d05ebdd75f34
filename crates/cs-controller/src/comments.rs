//! # Comment Panel
//!
//! Comment state keyed by the owning suggestion id. Whenever the key
//! changes the whole list reloads; an unset key yields an empty list, never
//! a stale one from the previous suggestion.

use std::sync::Arc;

use uuid::Uuid;

use cs_core::policy;
use cs_core::{AppError, Comment, CommentStore, Identity, NewComment, Result};

pub struct CommentPanel {
    store: Arc<dyn CommentStore>,
    suggestion_id: Option<Uuid>,
    comments: Vec<Comment>,
}

impl CommentPanel {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        CommentPanel {
            store,
            suggestion_id: None,
            comments: Vec::new(),
        }
    }

    /// Points the panel at a (possibly unset) suggestion and reloads.
    pub async fn retarget(&mut self, suggestion_id: Option<Uuid>) {
        self.suggestion_id = suggestion_id;
        self.reload().await;
    }

    async fn reload(&mut self) {
        let Some(id) = self.suggestion_id else {
            self.comments.clear();
            return;
        };
        match self.store.list_for(id).await {
            Ok(rows) => self.comments = rows,
            Err(err) => {
                log::error!("failed to load comments for {id}: {err}");
                self.comments.clear();
            }
        }
    }

    /// Adds a comment. Blank content, a missing identity, or an unsaved
    /// suggestion make this a silent no-op; the rating is clamped to 1-5
    /// before it ever reaches the store.
    pub async fn add(&mut self, identity: Option<&Identity>, content: &str, rating: i32) -> Result<()> {
        let Some(identity) = identity else { return Ok(()) };
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }
        let Some(suggestion_id) = self.suggestion_id else { return Ok(()) };
        self.store
            .insert(NewComment {
                suggestion_id,
                username: identity.username.clone(),
                content: content.to_string(),
                rating: rating.clamp(1, 5),
            })
            .await?;
        self.reload().await;
        Ok(())
    }

    /// Edits a comment's content and rating. Owner-only; checked here,
    /// before any store call, whatever the store itself enforces.
    pub async fn update(&mut self, identity: &Identity, id: Uuid, content: &str, rating: i32) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }
        let Some(comment) = self.comments.iter().find(|c| c.id == id) else {
            return Err(AppError::NotFound("That comment no longer exists.".to_string()));
        };
        if !policy::can_edit_comment(identity, comment) {
            return Err(AppError::Permission("You can only edit your own comments.".to_string()));
        }
        self.store.update(id, content, rating.clamp(1, 5)).await?;
        self.reload().await;
        Ok(())
    }

    /// Deletes a comment. Allowed for its author or a curator; everyone
    /// else is rejected with an explicit message before any store call.
    pub async fn delete(&mut self, identity: Option<&Identity>, id: Uuid) -> Result<()> {
        let Some(identity) = identity else { return Ok(()) };
        let Some(comment) = self.comments.iter().find(|c| c.id == id) else {
            return Ok(());
        };
        if !policy::can_delete_comment(identity, comment) {
            return Err(AppError::Permission("You can only delete your own comments".to_string()));
        }
        match self.store.delete(id).await {
            Ok(()) => {
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to delete comment {id}: {err}");
                Err(AppError::Transport(
                    "Failed to delete comment. Please try again.".to_string(),
                ))
            }
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Arithmetic mean of the loaded ratings, rounded to one decimal.
    /// An empty list averages to zero.
    pub fn average_rating(&self) -> f64 {
        if self.comments.is_empty() {
            return 0.0;
        }
        let sum: i32 = self.comments.iter().map(|c| c.rating).sum();
        (sum as f64 / self.comments.len() as f64 * 10.0).round() / 10.0
    }

    /// The rating shown next to the comment count; suppressed entirely when
    /// there are no comments.
    pub fn displayed_rating(&self) -> Option<f64> {
        if self.comments.is_empty() {
            None
        } else {
            Some(self.average_rating())
        }
    }
}
