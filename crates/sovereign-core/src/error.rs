//! Error types for Sovereign Core.

use thiserror::Error;

/// Core errors. The pure engine never fails under valid input; these cover
/// malformed external data and lookups against static tables.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}
