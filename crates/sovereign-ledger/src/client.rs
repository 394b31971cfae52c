//! LedgerClient: the consumed interface to the external ledger.
//!
//! Implementations wrap a real RPC connection; tests use the in-memory
//! client from the testkit crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use sovereign_core::TxSignature;

use crate::error::AnchorFailure;

/// A transaction-ordering token ("recent blockhash"). Transactions referencing
/// a stale token are rejected by the ledger, so one is fetched immediately
/// before signing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderingToken(String);

impl OrderingToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OrderingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderingToken({})", self.0)
    }
}

/// A confirmed transaction as returned by ledger lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub signature: TxSignature,
    pub slot: u64,
    /// Block time as Unix seconds, when the ledger reports one.
    pub block_time: Option<i64>,
    /// The memo data carried by the transaction, if any.
    pub memo: Option<String>,
}

/// Async interface to the external ledger.
///
/// Errors map directly onto [`AnchorFailure`]: transport problems are
/// `Network`, ledger-side refusals are `Rejected`, and an unconfirmed
/// transaction after the confirmation window is `Timeout`.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch a fresh ordering token.
    async fn latest_ordering_token(&self) -> std::result::Result<OrderingToken, AnchorFailure>;

    /// Submit a signed transaction, returning its signature.
    async fn submit(&self, signed_tx: &[u8]) -> std::result::Result<TxSignature, AnchorFailure>;

    /// Block until the transaction is confirmed under the given token.
    ///
    /// Returns `Err(Timeout)` if confirmation is not observed in time; the
    /// caller must treat the transaction as not anchored.
    async fn confirm(
        &self,
        signature: &TxSignature,
        token: &OrderingToken,
    ) -> std::result::Result<(), AnchorFailure>;

    /// Look up a transaction by signature. `Ok(None)` means not found.
    async fn get_transaction(
        &self,
        signature: &TxSignature,
    ) -> std::result::Result<Option<TransactionRecord>, AnchorFailure>;

    /// The current fee per signature, in fee units.
    async fn fee_per_signature(&self) -> std::result::Result<u64, AnchorFailure>;
}
