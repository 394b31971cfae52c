//! Mock ledger and signers for tests.
//!
//! [`MockLedger`] implements the full [`LedgerClient`] trait in memory and
//! can be scripted to fail at any step of the anchor protocol. Submitted
//! transactions are retained for inspection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sovereign_core::{TxSignature, WalletAddress};
use sovereign_ledger::{
    AnchorFailure, LedgerClient, LedgerError, OrderingToken, SignedTransaction, Signer,
    Transaction, TransactionRecord,
};

/// Where the mock ledger should fail, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    None,
    /// `submit` fails with a network error.
    SubmitNetwork,
    /// `submit` fails with a rejection.
    SubmitRejected,
    /// `confirm` times out.
    ConfirmTimeout,
    /// `fee_per_signature` fails.
    FeeQuery,
}

/// In-memory [`LedgerClient`] with scriptable failures.
pub struct MockLedger {
    failure: FailureMode,
    fee: u64,
    counter: AtomicU64,
    submitted: Mutex<Vec<SignedTransaction>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self::failing_at(FailureMode::None)
    }

    pub fn failing_at(failure: FailureMode) -> Self {
        Self {
            failure,
            fee: 5_000,
            counter: AtomicU64::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Every transaction accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Number of accepted submissions.
    pub fn submission_count(&self) -> usize {
        self.submitted().len()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn latest_ordering_token(&self) -> Result<OrderingToken, AnchorFailure> {
        let n = self.counter.load(Ordering::SeqCst);
        Ok(OrderingToken::new(format!("token-{n}")))
    }

    async fn submit(&self, signed_tx: &[u8]) -> Result<TxSignature, AnchorFailure> {
        match self.failure {
            FailureMode::SubmitNetwork => {
                return Err(AnchorFailure::Network("connection reset".to_string()))
            }
            FailureMode::SubmitRejected => {
                return Err(AnchorFailure::Rejected("user declined".to_string()))
            }
            _ => {}
        }

        let parsed = SignedTransaction::from_bytes(signed_tx)
            .map_err(|e| AnchorFailure::Rejected(format!("undecodable transaction: {e}")))?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .map_err(|_| AnchorFailure::Network("mock poisoned".to_string()))?
            .push(parsed);
        Ok(TxSignature::new(format!("mock-sig-{n}")))
    }

    async fn confirm(
        &self,
        _signature: &TxSignature,
        _token: &OrderingToken,
    ) -> Result<(), AnchorFailure> {
        if self.failure == FailureMode::ConfirmTimeout {
            return Err(AnchorFailure::Timeout);
        }
        Ok(())
    }

    async fn get_transaction(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransactionRecord>, AnchorFailure> {
        let known = {
            let count = self.counter.load(Ordering::SeqCst);
            (0..count).any(|n| signature.as_str() == format!("mock-sig-{n}"))
        };
        if !known {
            return Ok(None);
        }
        Ok(Some(TransactionRecord {
            signature: signature.clone(),
            slot: 42,
            block_time: Some(1_700_000_000),
            memo: None,
        }))
    }

    async fn fee_per_signature(&self) -> Result<u64, AnchorFailure> {
        if self.failure == FailureMode::FeeQuery {
            return Err(AnchorFailure::Network("rpc down".to_string()));
        }
        Ok(self.fee)
    }
}

/// A signer that refuses to sign anything, like a user declining a wallet
/// prompt.
pub struct RejectingSigner {
    wallet: WalletAddress,
}

impl RejectingSigner {
    pub fn new(wallet: WalletAddress) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl Signer for RejectingSigner {
    fn address(&self) -> Result<WalletAddress, LedgerError> {
        Ok(self.wallet.clone())
    }

    async fn sign(&self, _transaction: &Transaction) -> Result<SignedTransaction, LedgerError> {
        Err(LedgerError::AnchorFailed(AnchorFailure::Rejected(
            "signing request declined".to_string(),
        )))
    }
}

/// A signer with no connected identity at all.
pub struct UnavailableSigner;

#[async_trait]
impl Signer for UnavailableSigner {
    fn address(&self) -> Result<WalletAddress, LedgerError> {
        Err(LedgerError::SignerUnavailable(
            "no wallet connected".to_string(),
        ))
    }

    async fn sign(&self, _transaction: &Transaction) -> Result<SignedTransaction, LedgerError> {
        Err(LedgerError::SignerUnavailable(
            "no wallet connected".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sovereign_core::{ChatHash, Sha256Hash};
    use sovereign_ledger::LocalSigner;

    fn chat_hash() -> ChatHash {
        ChatHash {
            hash: Sha256Hash::hash(b"history"),
            message_count: 2,
            timestamp: "2024-01-01T10:00:00Z".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_mock_ledger_accepts_and_records() {
        let signer = LocalSigner::from_seed(&[9; 32]);
        let ledger = MockLedger::new();

        let result = sovereign_ledger::anchor(&signer, &ledger, &chat_hash())
            .await
            .unwrap();
        assert_eq!(result.signature.as_str(), "mock-sig-0");
        assert_eq!(ledger.submission_count(), 1);
        assert_eq!(ledger.submitted()[0].transaction.amount, 0);
    }

    #[tokio::test]
    async fn test_mock_ledger_signatures_unique() {
        let signer = LocalSigner::from_seed(&[9; 32]);
        let ledger = MockLedger::new();

        let a = sovereign_ledger::anchor(&signer, &ledger, &chat_hash()).await.unwrap();
        let b = sovereign_ledger::anchor(&signer, &ledger, &chat_hash()).await.unwrap();
        assert_ne!(a.signature, b.signature);
    }

    #[tokio::test]
    async fn test_rejecting_signer() {
        let signer = RejectingSigner::new(WalletAddress::new("walletA"));
        let ledger = MockLedger::new();

        let err = sovereign_ledger::anchor(&signer, &ledger, &chat_hash())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AnchorFailed(AnchorFailure::Rejected(_))
        ));
        // Nothing reached the ledger.
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_signer() {
        let err = sovereign_ledger::anchor(&UnavailableSigner, &MockLedger::new(), &chat_hash())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SignerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_get_transaction_known_and_unknown() {
        let signer = LocalSigner::from_seed(&[9; 32]);
        let ledger = MockLedger::new();
        let result = sovereign_ledger::anchor(&signer, &ledger, &chat_hash()).await.unwrap();

        let found = ledger.get_transaction(&result.signature).await.unwrap();
        assert!(found.is_some());

        let missing = ledger
            .get_transaction(&TxSignature::new("unknown"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
