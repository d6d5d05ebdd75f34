//! # Domain Models
//!
//! These structs represent the core entities of capsule-studio.
//! Persisted rows use UUID v7 for time-ordered, globally unique
//! identification; an absent `id` means the record was never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The one tag with special UI treatment. It carries no other semantics.
pub const EARLY_ACCESS_TAG: &str = "Early Access";

/// A store-page preview ("capsule"): everything a listing shows.
///
/// All lexically-optional fields default to their zero values so a record
/// round-tripped through the store never contains a null field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestion {
    /// Present once persisted; assigned only by a successful insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    /// May contain lightweight markup; rendering is not our concern.
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub header_image: String,
    /// Ordered media URLs (images or video). Order is user-controlled.
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
    /// Owner identifier. Stamped by the save pipeline, never edited directly.
    #[serde(default)]
    pub username: String,
    /// At most one suggestion system-wide carries this (best effort).
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    /// The built-in starting point shown before anything is loaded.
    pub fn placeholder() -> Self {
        Suggestion {
            title: "Your Game Title".to_string(),
            short_description: "A brief description of your game".to_string(),
            long_description: "# About This Game\n\nAn open-ended adventure for 1-8 players, set in a \
hand-crafted archipelago of drifting islands. Sail, scavenge, and build your way toward the storm \
at the edge of the map.\n\n## Key Features\n\n- **Living Islands**: every island drifts, erodes, \
and regrows between visits\n- **Deep Crafting**: combine salvage into ships, outposts, and \
contraptions\n- **Shared Seas**: meet other crews in a common world\n\n## Your Voyage\n\nYou wake \
on a raft with a compass that points at nothing. Follow it anyway."
                .to_string(),
            header_image: "https://images.unsplash.com/photo-1500964757637-c85e8a162699".to_string(),
            screenshots: vec![
                "https://images.unsplash.com/photo-1518709766631-a6a7f45921c3".to_string(),
                "https://images.unsplash.com/photo-1516541196182-6bdb0516ed27".to_string(),
                "https://images.unsplash.com/photo-1530071100468-90954e4921d5".to_string(),
            ],
            tags: vec![
                "Open World Survival Craft".to_string(),
                "Survival".to_string(),
                "Online Co-Op".to_string(),
                "Building".to_string(),
                "Exploration".to_string(),
            ],
            price: 19.99,
            ..Suggestion::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_early_access(&self) -> bool {
        self.tags.iter().any(|t| t == EARLY_ACCESS_TAG)
    }
}

/// The outgoing save payload: a [`Suggestion`] minus its `id`, with every
/// field normalized and `username` stamped to the acting identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub title: String,
    pub short_description: String,
    pub long_description: String,
    pub header_image: String,
    pub screenshots: Vec<String>,
    pub tags: Vec<String>,
    pub price: f64,
    pub username: String,
    pub is_default: bool,
}

impl SuggestionRecord {
    /// Builds the payload for the save pipeline. The `id` is not carried;
    /// `username` is overridden unconditionally; `price` collapses to zero
    /// when negative or not a number.
    pub fn from_suggestion(suggestion: &Suggestion, acting_username: &str) -> Self {
        let price = if suggestion.price.is_finite() {
            suggestion.price.max(0.0)
        } else {
            0.0
        };
        SuggestionRecord {
            title: suggestion.title.clone(),
            short_description: suggestion.short_description.clone(),
            long_description: suggestion.long_description.clone(),
            header_image: suggestion.header_image.clone(),
            screenshots: suggestion.screenshots.clone(),
            tags: suggestion.tags.clone(),
            price,
            username: acting_username.to_string(),
            is_default: suggestion.is_default,
        }
    }
}

/// Feedback attached to a persisted suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub suggestion_id: Uuid,
    pub username: String,
    pub content: String,
    /// Integer 1-5.
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Insert payload for a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub suggestion_id: Uuid,
    pub username: String,
    pub content: String,
    pub rating: i32,
}

/// Explicit role claim on an identity. Curators may delete any suggestion or
/// comment and choose the default template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Curator,
}

/// The acting identity handed to every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

/// The locally persisted sign-in record. There is no real authentication
/// behind it; the session is a stub kept under a fixed key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Session {
            username: username.into(),
            role,
            created_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            role: self.role,
        }
    }
}
