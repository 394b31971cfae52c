//! Error types for ledger anchoring.

use thiserror::Error;

/// Why an anchor attempt failed. The whole flow is retryable by restarting
/// from a fresh digest; no partial state exists to clean up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("confirmation timed out")]
    Timeout,
}

/// Errors from the anchoring subsystem.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No wallet or signing capability. Not retryable without user action.
    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// The anchor flow failed mid-way. Nothing was committed.
    #[error("anchor failed: {0}")]
    AnchorFailed(#[from] AnchorFailure),

    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
