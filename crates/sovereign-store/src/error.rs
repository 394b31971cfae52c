//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The wallet has no profile. Onboarding (`create_profile`) is an
    /// explicit separate step.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// A profile already exists for this wallet.
    #[error("profile already exists: {0}")]
    ProfileExists(String),

    /// Serialization/deserialization error for stored values.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Runtime-level failure (task join, poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
