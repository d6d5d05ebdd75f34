//! # Permission Policy
//!
//! Every capability check the controllers make, in one place. Mutating
//! operations consult these instead of re-deriving ownership conditions
//! inline.

use crate::models::{Comment, Identity, Role, Suggestion};

/// Curators hold the elevated claim; nothing is keyed to a literal username.
pub fn is_privileged(identity: &Identity) -> bool {
    identity.role == Role::Curator
}

/// In-place updates only ever touch the identity's own rows.
pub fn can_update(identity: &Identity, suggestion: &Suggestion) -> bool {
    suggestion.username == identity.username
}

pub fn can_delete(identity: &Identity, suggestion: &Suggestion) -> bool {
    suggestion.username == identity.username || is_privileged(identity)
}

pub fn can_edit_comment(identity: &Identity, comment: &Comment) -> bool {
    comment.username == identity.username
}

pub fn can_delete_comment(identity: &Identity, comment: &Comment) -> bool {
    comment.username == identity.username || is_privileged(identity)
}
