//! # Suggestion Controller
//!
//! Keeps the in-memory "current suggestion" consistent across its four
//! sources (own editable capsule, default template, shared read-only view,
//! navigated list item) and mediates every read and write through the store
//! ports. Methods take `&mut self`, so conflicting mutations cannot
//! interleave within one controller.

use std::sync::Arc;

use uuid::Uuid;

use cs_core::policy;
use cs_core::{
    capsule_path, AppError, Identity, Result, Role, Session, SessionStore, ShareTarget,
    Suggestion, SuggestionRecord, SuggestionStore,
};

/// The single active-field token: exactly one field is editable at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    ShortDescription,
    LongDescription,
    HeaderImage,
    Screenshots,
    Tags,
    Price,
}

/// Where a picked media URL lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTarget {
    Header,
    Screenshots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

pub struct SuggestionController {
    store: Arc<dyn SuggestionStore>,
    sessions: Arc<dyn SessionStore>,
    identity: Option<Identity>,
    current: Suggestion,
    known: Vec<Suggestion>,
    default_template: Option<Suggestion>,
    active_field: Option<Field>,
    share_target: Option<ShareTarget>,
    selected_media: usize,
}

impl SuggestionController {
    pub fn new(store: Arc<dyn SuggestionStore>, sessions: Arc<dyn SessionStore>) -> Self {
        SuggestionController {
            store,
            sessions,
            identity: None,
            current: Suggestion::placeholder(),
            known: Vec::new(),
            default_template: None,
            active_field: None,
            share_target: None,
            selected_media: 0,
        }
    }

    // ── session ──────────────────────────────────────────────────────────

    /// Adopts the locally saved session, if any. Corrupt session data was
    /// already discarded by the session store.
    pub fn restore_session(&mut self) {
        if let Some(session) = self.sessions.load() {
            self.identity = Some(session.identity());
        }
    }

    pub fn sign_in(&mut self, username: &str, role: Role) -> Result<Identity> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("A name is required to sign in.".to_string()));
        }
        let session = Session::new(username, role);
        self.sessions.save(&session)?;
        let identity = session.identity();
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    pub fn sign_out(&mut self) {
        if let Err(err) = self.sessions.clear() {
            log::warn!("failed to clear saved session: {err}");
        }
        self.identity = None;
        self.known.clear();
        self.active_field = None;
        if let Some(template) = &self.default_template {
            self.current = template.clone();
            self.selected_media = 0;
        }
    }

    // ── loading ──────────────────────────────────────────────────────────

    /// Fetches the row flagged as default template. Non-fatal on any
    /// failure: the condition is logged and `current` stays as it was.
    pub async fn load_default(&mut self) {
        match self.store.fetch_default().await {
            Ok(Some(row)) => {
                // only take over the view when nothing else has claimed it
                if self.share_target.is_none() && self.current.id.is_none() {
                    self.current = row.clone();
                    self.selected_media = 0;
                }
                self.default_template = Some(row);
            }
            Ok(None) => log::debug!("no default template configured"),
            Err(err) => log::warn!("failed to load default template: {err}"),
        }
    }

    /// Loads a capsule by its `(username, title)` share key and engages the
    /// read-only shared view. The title arrives percent-decoded and may
    /// contain anything.
    pub async fn load_shared(&mut self, username: &str, title: &str) -> Result<()> {
        match self.store.fetch_shared(username, title).await {
            Ok(Some(row)) => {
                self.current = row;
                self.active_field = None;
                self.selected_media = 0;
                self.share_target = Some(ShareTarget {
                    username: username.to_string(),
                    title: title.to_string(),
                });
                Ok(())
            }
            Ok(None) => Err(AppError::NotFound(
                "This game capsule does not exist or has been removed.".to_string(),
            )),
            Err(err) => {
                log::error!("failed to load shared capsule {username}/{title}: {err}");
                Err(AppError::Transport(
                    "Failed to load the game capsule. Please try again later.".to_string(),
                ))
            }
        }
    }

    /// Replaces the known-list wholesale, newest first. On transport failure
    /// the previous list is kept rather than cleared.
    pub async fn load_list(&mut self) -> Result<()> {
        match self.store.list_recent().await {
            Ok(rows) => {
                self.known = rows;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to load suggestions: {err}");
                Err(AppError::Transport(
                    "Failed to load suggestions. Please try again later.".to_string(),
                ))
            }
        }
    }

    // ── editing ──────────────────────────────────────────────────────────

    /// Opens one field for editing, implicitly closing any other.
    pub fn begin_edit(&mut self, field: Field) -> Result<()> {
        self.require_identity("Please sign in to edit this capsule.")?;
        if self.is_read_only() {
            return Err(AppError::Permission(
                "Shared capsules are read-only. Save a copy to make changes.".to_string(),
            ));
        }
        self.active_field = Some(field);
        Ok(())
    }

    pub fn end_edit(&mut self) {
        self.active_field = None;
    }

    pub fn set_title(&mut self, value: impl Into<String>) -> Result<()> {
        self.guard_edit(Field::Title)?;
        self.current.title = value.into();
        Ok(())
    }

    pub fn set_short_description(&mut self, value: impl Into<String>) -> Result<()> {
        self.guard_edit(Field::ShortDescription)?;
        self.current.short_description = value.into();
        Ok(())
    }

    pub fn set_long_description(&mut self, value: impl Into<String>) -> Result<()> {
        self.guard_edit(Field::LongDescription)?;
        self.current.long_description = value.into();
        Ok(())
    }

    /// Stores the price as entered; the save pipeline normalizes bad values.
    pub fn set_price(&mut self, value: f64) -> Result<()> {
        self.guard_edit(Field::Price)?;
        self.current.price = value;
        Ok(())
    }

    pub fn add_tag(&mut self, tag: &str) -> Result<()> {
        self.guard_edit(Field::Tags)?;
        let tag = tag.trim();
        if !tag.is_empty() {
            self.current.tags.push(tag.to_string());
        }
        Ok(())
    }

    pub fn remove_tag(&mut self, index: usize) -> Result<()> {
        self.guard_edit(Field::Tags)?;
        if index < self.current.tags.len() {
            self.current.tags.remove(index);
        }
        Ok(())
    }

    /// Applies a media-library pick: `Header` replaces the header image,
    /// `Screenshots` appends to the end of the reel.
    pub fn select_media(&mut self, url: &str, target: MediaTarget) -> Result<()> {
        self.require_identity("Please sign in to access the media library.")?;
        match target {
            MediaTarget::Header => self.current.header_image = url.to_string(),
            MediaTarget::Screenshots => self.current.screenshots.push(url.to_string()),
        }
        Ok(())
    }

    // ── screenshot reel ──────────────────────────────────────────────────

    pub fn select_screenshot(&mut self, index: usize) {
        self.selected_media = index.min(self.current.screenshots.len().saturating_sub(1));
    }

    pub fn reorder_screenshots(&mut self, new_order: Vec<String>) {
        self.current.screenshots = new_order;
        self.selected_media = self
            .selected_media
            .min(self.current.screenshots.len().saturating_sub(1));
    }

    /// Removes one entry and clamps the selection pointer back into range.
    pub fn delete_screenshot(&mut self, index: usize) {
        if index >= self.current.screenshots.len() {
            return;
        }
        self.current.screenshots.remove(index);
        self.selected_media = self
            .selected_media
            .min(self.current.screenshots.len().saturating_sub(1));
    }

    // ── persistence ──────────────────────────────────────────────────────

    /// The save pipeline: validate, normalize, stamp the acting identity,
    /// then update in place only for the identity's own row. A foreign id
    /// always becomes an insert, never someone else's update.
    pub async fn save(&mut self) -> Result<Suggestion> {
        let identity = self.require_identity("Please sign in to save suggestions.")?;
        if self.current.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        // a shared capsule someone else owns is never mutated in place
        if let Some(target) = &self.share_target {
            if target.username != identity.username {
                return self.save_as_copy().await;
            }
        }
        let record = SuggestionRecord::from_suggestion(&self.current, &identity.username);
        let outcome = match self.current.id {
            Some(id) if policy::can_update(&identity, &self.current) => {
                self.store.update(id, record).await
            }
            _ => self.store.insert(record).await,
        };
        let saved = outcome.map_err(save_failure)?;
        self.current = saved.clone();
        // a resolved shared view returns to the plain location
        self.share_target = None;
        if let Err(err) = self.load_list().await {
            log::warn!("saved, but refreshing the list failed: {err}");
        }
        Ok(saved)
    }

    /// Like [`save`](Self::save), but the result is always a fresh row: the
    /// id is never carried over and a copy is never the default template.
    pub async fn save_as_copy(&mut self) -> Result<Suggestion> {
        let identity = self.require_identity("Please sign in to save suggestions.")?;
        if self.current.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        let mut record = SuggestionRecord::from_suggestion(&self.current, &identity.username);
        record.is_default = false;
        let saved = self.store.insert(record).await.map_err(save_failure)?;
        self.current = saved.clone();
        self.share_target = None;
        if let Err(err) = self.load_list().await {
            log::warn!("saved, but refreshing the list failed: {err}");
        }
        Ok(saved)
    }

    /// Deletes a row the policy allows the identity to remove. Success
    /// filters the id out of the known-list; failure reloads the list from
    /// the store instead of trusting the optimistic removal.
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        let identity = self.require_identity("Please sign in to delete suggestions.")?;
        if let Some(record) = self.known.iter().find(|s| s.id == Some(id)) {
            if !policy::can_delete(&identity, record) {
                return Err(AppError::Permission(
                    "You can only delete your own suggestions.".to_string(),
                ));
            }
        }
        let owner = if policy::is_privileged(&identity) {
            None
        } else {
            Some(identity.username.as_str())
        };
        match self.store.delete(id, owner).await {
            Ok(()) => {
                // look up by id; concurrent loads may have reordered the list
                self.known.retain(|s| s.id != Some(id));
                if self.current.id == Some(id) {
                    if let Some(template) = self.default_template.clone() {
                        self.current = template;
                        self.active_field = None;
                        self.selected_media = 0;
                    }
                }
                Ok(())
            }
            Err(err) => {
                log::error!("failed to delete suggestion {id}: {err}");
                if let Err(reload) = self.load_list().await {
                    log::warn!("list reload after failed delete also failed: {reload}");
                }
                Err(AppError::Transport(
                    "Failed to delete suggestion. Please try again.".to_string(),
                ))
            }
        }
    }

    /// Curator-only. Two steps, not atomic: the old default must be cleared
    /// before the new one is set, and a failure in the first step stops the
    /// second. The window between the steps has no default row.
    pub async fn mark_as_default(&mut self, id: Uuid) -> Result<()> {
        let identity = self.require_identity("Please sign in first.")?;
        if !policy::is_privileged(&identity) {
            return Err(AppError::Permission(
                "Only curators can choose the default template.".to_string(),
            ));
        }
        self.store
            .clear_default(&identity.username)
            .await
            .map_err(default_failure)?;
        self.store.set_default(id).await.map_err(default_failure)?;
        if let Err(err) = self.load_list().await {
            log::warn!("list refresh after default change failed: {err}");
        }
        self.load_default().await;
        Ok(())
    }

    // ── navigation ───────────────────────────────────────────────────────

    /// Steps through the known-list as currently held, wrapping at both
    /// ends. A current id missing from the list jumps to the head.
    pub fn navigate(&mut self, direction: Direction) {
        if self.known.is_empty() {
            return;
        }
        let position = self
            .known
            .iter()
            .position(|s| s.id.is_some() && s.id == self.current.id);
        let index = match position {
            None => 0,
            Some(i) => match direction {
                Direction::Next => (i + 1) % self.known.len(),
                Direction::Prev => i.checked_sub(1).unwrap_or(self.known.len() - 1),
            },
        };
        let next = self.known[index].clone();
        self.adopt(next);
    }

    /// Jumps straight to a list entry. Unknown ids are ignored.
    pub fn select_suggestion(&mut self, id: Uuid) {
        if let Some(next) = self.known.iter().find(|s| s.id == Some(id)).cloned() {
            self.adopt(next);
        }
    }

    fn adopt(&mut self, suggestion: Suggestion) {
        self.current = suggestion;
        self.active_field = None;
        self.selected_media = 0;
        // leaving a shared view restores the plain location
        self.share_target = None;
    }

    // ── views ────────────────────────────────────────────────────────────

    pub fn current(&self) -> &Suggestion {
        &self.current
    }

    pub fn known(&self) -> &[Suggestion] {
        &self.known
    }

    pub fn default_template(&self) -> Option<&Suggestion> {
        self.default_template.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn active_field(&self) -> Option<Field> {
        self.active_field
    }

    pub fn share_target(&self) -> Option<&ShareTarget> {
        self.share_target.as_ref()
    }

    pub fn selected_media(&self) -> usize {
        self.selected_media
    }

    pub fn is_read_only(&self) -> bool {
        self.share_target.is_some()
    }

    /// The shareable path for the current capsule, attributed to the acting
    /// identity.
    pub fn share_path(&self) -> Option<String> {
        let identity = self.identity.as_ref()?;
        Some(capsule_path(&identity.username, &self.current.title))
    }

    fn require_identity(&self, message: &str) -> Result<Identity> {
        self.identity
            .clone()
            .ok_or_else(|| AppError::Permission(message.to_string()))
    }

    fn guard_edit(&self, field: Field) -> Result<()> {
        if self.active_field != Some(field) {
            return Err(AppError::Permission("This field is not open for editing.".to_string()));
        }
        Ok(())
    }
}

/// Validation messages pass through verbatim; everything else collapses to
/// the generic save failure. `current` is untouched either way.
fn save_failure(err: AppError) -> AppError {
    if err.is_validation() {
        err
    } else {
        log::error!("save failed: {err}");
        AppError::Transport("Failed to save game capsule. Please try again.".to_string())
    }
}

fn default_failure(err: AppError) -> AppError {
    log::error!("default template change failed: {err}");
    AppError::Transport("Failed to set default template. Please try again.".to_string())
}
