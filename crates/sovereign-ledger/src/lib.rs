//! # Sovereign Ledger
//!
//! On-chain anchoring for the Sovereign subsystem: builds, signs, submits,
//! and confirms the minimal commitment transactions that bind a chat digest
//! (or credential hash) to the ledger.
//!
//! ## Protocol
//!
//! An anchor is a zero-value self-transfer carrying a JSON commitment record
//! as transaction memo data. The transfer is a no-op carrier; the only cost
//! is the base network fee. The flow is strictly sequential:
//!
//! 1. Resolve the signer's public identity (fails `SignerUnavailable`)
//! 2. Fetch a fresh ordering token immediately before signing
//! 3. Sign, submit, and **block until ledger confirmation**
//!
//! Callers only ever observe confirmed anchors. Any failure along the way
//! surfaces as a distinguishable [`LedgerError::AnchorFailed`] and commits
//! nothing.
//!
//! ## Key Types
//!
//! - [`Signer`] - public identity + transaction-signing capability
//! - [`LedgerClient`] - the consumed ledger interface (submit/confirm/query)
//! - [`CommitmentRecord`] - the memo payload (memory anchor or credential)
//! - [`anchor`] / [`estimate_cost`] / [`verify`] - the three operations

pub mod anchor;
pub mod client;
pub mod error;
pub mod signer;
pub mod transaction;

pub use anchor::{
    anchor, anchor_commitment, estimate_cost, explorer_url, verify, AnchorResult,
    CommitmentRecord, CostEstimate, Verification, DEFAULT_FEE_UNITS,
};
pub use client::{LedgerClient, OrderingToken, TransactionRecord};
pub use error::{AnchorFailure, LedgerError, Result};
pub use signer::{LocalSigner, Signer};
pub use transaction::{SignedTransaction, Transaction};
