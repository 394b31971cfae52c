//! The anchor protocol: commit a digest to the ledger and wait for
//! confirmation.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sovereign_core::{ChatHash, Sha256Hash, TxSignature};

use crate::client::LedgerClient;
use crate::error::{LedgerError, Result};
use crate::signer::Signer;
use crate::transaction::Transaction;

/// Fallback fee estimate when the ledger fee query fails.
pub const DEFAULT_FEE_UNITS: u64 = 5_000;

/// Fee units per native token.
const UNITS_PER_NATIVE: f64 = 1e9;

/// The JSON commitment record embedded as transaction memo data.
///
/// The `type` tag distinguishes memory anchors from credential mints; both
/// use the same commit-and-confirm protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommitmentRecord {
    #[serde(rename = "SOVEREIGN_MEMORY_ANCHOR")]
    MemoryAnchor {
        hash: Sha256Hash,
        #[serde(rename = "messageCount")]
        message_count: u32,
        timestamp: String,
    },

    #[serde(rename = "SOVEREIGN_PROGRESS_CREDENTIAL")]
    ProgressCredential {
        #[serde(rename = "metadataHash")]
        metadata_hash: Sha256Hash,
        name: String,
        symbol: String,
        timestamp: String,
    },
}

/// A confirmed anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorResult {
    pub signature: TxSignature,
    pub explorer_url: String,
    pub timestamp: DateTime<Utc>,
}

/// Best-effort anchoring cost estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub fee_units: u64,
    pub native_cost: f64,
}

/// Result of looking an anchor up on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub verified: bool,
    pub block_time: Option<i64>,
    pub slot: Option<u64>,
    pub message: String,
}

/// Explorer link for a transaction signature.
pub fn explorer_url(signature: &TxSignature) -> String {
    format!("https://explorer.solana.com/tx/{signature}?cluster=devnet")
}

/// Anchor a chat digest to the ledger.
///
/// Blocks until ledger confirmation. On any failure nothing is committed;
/// the caller retries by re-digesting current state.
pub async fn anchor(
    signer: &dyn Signer,
    client: &dyn LedgerClient,
    chat_hash: &ChatHash,
) -> Result<AnchorResult> {
    let record = CommitmentRecord::MemoryAnchor {
        hash: chat_hash.hash,
        message_count: chat_hash.message_count,
        timestamp: chat_hash
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    anchor_commitment(signer, client, &record).await
}

/// Commit any record to the ledger with the shared protocol.
///
/// Order matters: the ordering token is fetched immediately before signing
/// so the transaction never references a stale token, and the result is
/// returned only after the ledger confirms.
pub async fn anchor_commitment(
    signer: &dyn Signer,
    client: &dyn LedgerClient,
    record: &CommitmentRecord,
) -> Result<AnchorResult> {
    let wallet = signer.address()?;
    let memo = serde_json::to_string(record).map_err(|e| LedgerError::Encoding(e.to_string()))?;

    debug!(%wallet, "fetching ordering token");
    let token = client.latest_ordering_token().await?;

    let transaction = Transaction::self_transfer_with_memo(wallet.clone(), memo, token.clone());
    let signed = signer.sign(&transaction).await?;

    let signature = client.submit(&signed.to_bytes()?).await?;
    debug!(%wallet, %signature, "submitted, awaiting confirmation");

    client.confirm(&signature, &token).await?;
    info!(%wallet, %signature, "anchor confirmed");

    Ok(AnchorResult {
        explorer_url: explorer_url(&signature),
        signature,
        timestamp: Utc::now(),
    })
}

/// Estimate the cost of one anchor. Never fails: falls back to the default
/// fee when the query errors.
pub async fn estimate_cost(client: &dyn LedgerClient) -> CostEstimate {
    let fee_units = match client.fee_per_signature().await {
        Ok(fee) => fee,
        Err(e) => {
            warn!(error = %e, "fee query failed, using default estimate");
            DEFAULT_FEE_UNITS
        }
    };
    CostEstimate {
        fee_units,
        native_cost: fee_units as f64 / UNITS_PER_NATIVE,
    }
}

/// Look a transaction up by signature.
///
/// Returns `verified: false` with a reason both when the transaction is not
/// found and when the query itself fails; the messages distinguish the two.
pub async fn verify(client: &dyn LedgerClient, signature: &TxSignature) -> Verification {
    match client.get_transaction(signature).await {
        Ok(Some(record)) => Verification {
            verified: true,
            block_time: record.block_time,
            slot: Some(record.slot),
            message: "hash verified on ledger".to_string(),
        },
        Ok(None) => Verification {
            verified: false,
            block_time: None,
            slot: None,
            message: "transaction not found".to_string(),
        },
        Err(e) => Verification {
            verified: false,
            block_time: None,
            slot: None,
            message: format!("query error: {e}"),
        },
    }
}
