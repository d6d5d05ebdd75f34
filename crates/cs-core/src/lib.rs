//! capsule-studio/crates/cs-core/src/lib.rs
//!
//! The central domain logic and interface definitions for capsule-studio.

pub mod error;
pub mod media;
pub mod models;
pub mod policy;
pub mod share;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use media::*;
pub use models::*;
pub use share::*;
pub use traits::*;
