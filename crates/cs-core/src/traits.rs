//! # Core Traits (Ports)
//!
//! Any backend must implement these traits to be wired into the controller.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::media::MediaFile;
use crate::models::{Comment, NewComment, Session, Suggestion, SuggestionRecord};

/// Persistence contract for suggestions.
///
/// Implementations decide what happens to a deleted suggestion's comments
/// (cascade or orphan); the controller does not enforce it.
#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// The single row flagged as default template, if any.
    async fn fetch_default(&self) -> Result<Option<Suggestion>>;

    /// Exact-match lookup by the `(username, title)` share key.
    async fn fetch_shared(&self, username: &str, title: &str) -> Result<Option<Suggestion>>;

    /// All rows, newest first by creation time.
    async fn list_recent(&self) -> Result<Vec<Suggestion>>;

    /// Inserts and returns the created row with its server-assigned id and
    /// timestamps.
    async fn insert(&self, record: SuggestionRecord) -> Result<Suggestion>;

    /// Updates row `id` in place and returns the updated row.
    async fn update(&self, id: Uuid, record: SuggestionRecord) -> Result<Suggestion>;

    /// Deletes row `id`. When `owner` is given the delete only applies if the
    /// row's username matches it.
    async fn delete(&self, id: Uuid, owner: Option<&str>) -> Result<()>;

    /// Clears the default flag on all of `owner`'s rows.
    async fn clear_default(&self, owner: &str) -> Result<()>;

    /// Sets the default flag on row `id`.
    async fn set_default(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments on a suggestion, oldest first.
    async fn list_for(&self, suggestion_id: Uuid) -> Result<Vec<Comment>>;

    async fn insert(&self, record: NewComment) -> Result<Comment>;

    async fn update(&self, id: Uuid, content: &str, rating: i32) -> Result<Comment>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Object storage contract. The namespace is flat; there are no real
/// directories.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Every stored media object with its derived public URL.
    async fn list(&self) -> Result<Vec<MediaFile>>;

    /// Stores `data` under `name`, inferring the content type from the
    /// extension. The caller has already validated and derived `name`.
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<MediaFile>;

    async fn remove(&self, name: &str) -> Result<()>;
}

/// Local key-value persistence of the stub session record.
pub trait SessionStore: Send + Sync {
    /// The saved session, or `None` when absent or unparseable. Corrupt data
    /// is discarded, not surfaced.
    fn load(&self) -> Option<Session>;

    fn save(&self, session: &Session) -> Result<()>;

    fn clear(&self) -> Result<()>;
}
