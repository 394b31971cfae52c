//! Error types for the Sovereign facade.

use sovereign_core::CoreError;
use sovereign_ledger::LedgerError;
use sovereign_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Sovereign operations.
#[derive(Debug, Error)]
pub enum SovereignError {
    /// Digest / credential computation error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Ledger error (signer unavailable, anchor failed).
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Chat backend error.
    #[error("chat backend error: {0}")]
    Backend(#[from] crate::webhook::BackendError),

    /// Internal invariant failure (lock poisoning and the like).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for Sovereign operations.
pub type Result<T> = std::result::Result<T, SovereignError>;
