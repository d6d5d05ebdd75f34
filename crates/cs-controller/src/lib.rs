//! # cs-controller
//!
//! The headless orchestration layer for capsule-studio. Owns the
//! single-writer editing state (the "current suggestion"), the known-list,
//! and the comment and media panels; every UI-facing operation goes through
//! these types so the invariants stay centrally enforced.

pub mod comments;
pub mod media;
pub mod suggestion;

#[cfg(test)]
mod testutil;

pub use comments::CommentPanel;
pub use media::MediaLibrary;
pub use suggestion::{Direction, Field, MediaTarget, SuggestionController};
