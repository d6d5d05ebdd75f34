//! # AppError
//!
//! Centralized error handling for the capsule-studio ecosystem.
//! Every user action fails terminally into one of these classes; nothing is
//! retried automatically.

use thiserror::Error;

/// The primary error type for all cs-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected before anything is persisted (e.g. missing title,
    /// blank comment). The message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    /// A looked-up record is absent (e.g. a shared capsule that was removed).
    #[error("{0}")]
    NotFound(String),

    /// The acting identity may not perform the operation. Raised before any
    /// store round-trip is made.
    #[error("{0}")]
    Permission(String),

    /// Infrastructure failure (store unreachable, storage write failed).
    #[error("{0}")]
    Transport(String),
}

/// A specialized Result type for capsule-studio logic.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// True for failures whose message should be surfaced verbatim rather
    /// than replaced with a generic one.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
