//! The minimal commitment transaction.
//!
//! Anchors ride on a zero-value self-transfer: the transfer instruction is a
//! no-op, the memo carries the commitment record, and the fee payer is the
//! signer itself.

use serde::{Deserialize, Serialize};

use sovereign_core::{TxSignature, WalletAddress};

use crate::client::OrderingToken;
use crate::error::{LedgerError, Result};

/// An unsigned commitment transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub fee_payer: WalletAddress,
    pub from: WalletAddress,
    pub to: WalletAddress,
    /// Transfer amount in native base units. Always zero for anchors.
    pub amount: u64,
    /// JSON commitment record attached as memo data.
    pub memo: String,
    pub ordering_token: OrderingToken,
}

impl Transaction {
    /// Build the zero-value self-transfer carrying `memo`.
    pub fn self_transfer_with_memo(
        wallet: WalletAddress,
        memo: String,
        ordering_token: OrderingToken,
    ) -> Self {
        Self {
            fee_payer: wallet.clone(),
            from: wallet.clone(),
            to: wallet,
            amount: 0,
            memo,
            ordering_token,
        }
    }

    /// The bytes the signer signs over.
    pub fn message_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Encoding(e.to_string()))
    }
}

/// A transaction together with its signature, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: TxSignature,
}

impl SignedTransaction {
    /// Serialize for wire submission.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LedgerError::Encoding(e.to_string()))
    }

    /// Parse back from wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Encoding(e.to_string()))
    }
}
