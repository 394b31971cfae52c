//! End-to-end scenarios: chat, anchor, progress, and credential minting
//! against an in-memory store and a scripted mock ledger.

use async_trait::async_trait;

use sovereign::{
    BackendError, ChatBackend, ChatRequest, SaveOutcome, Sovereign, SovereignConfig,
    SovereignError,
};
use sovereign_core::{AchievementId, AttributeValue, CoreError, Role, Topic, WalletAddress};
use sovereign_ledger::{AnchorFailure, CommitmentRecord, LedgerError, LocalSigner};
use sovereign_store::{MemoryStore, Store, StoreError};
use sovereign_testkit::{FailureMode, MockLedger, RejectingSigner};

/// Backend that always answers with the same canned reply.
struct CannedBackend(&'static str);

#[async_trait]
impl ChatBackend for CannedBackend {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, BackendError> {
        Ok(self.0.to_string())
    }
}

/// Backend that fails every request.
struct DownBackend;

#[async_trait]
impl ChatBackend for DownBackend {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, BackendError> {
        Err(BackendError::MalformedReply("503 service unavailable".to_string()))
    }
}

/// Route tracing output through the test harness. Idempotent across tests.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sovereign=debug".into()),
        )
        .try_init();
}

fn sovereign() -> Sovereign<MemoryStore, MockLedger> {
    init_tracing();
    Sovereign::new(MemoryStore::new(), MockLedger::new(), SovereignConfig::default())
}

fn sovereign_failing_at(mode: FailureMode) -> Sovereign<MemoryStore, MockLedger> {
    init_tracing();
    Sovereign::new(
        MemoryStore::new(),
        MockLedger::failing_at(mode),
        SovereignConfig::default(),
    )
}

#[tokio::test]
async fn test_chat_then_anchor_then_summary() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[1; 32]);
    let wallet = signer.wallet_address();
    let backend = CannedBackend("Ownership means each value has a single owner.");

    // One exchange: user message plus canned reply.
    let turn = sov
        .send_message(&backend, &wallet, "Explain ownership in Rust")
        .await
        .unwrap();
    assert_eq!(turn.reply.role, Role::Assistant);
    assert_eq!(turn.profile.xp, 10);
    assert_eq!(turn.profile.level, 1);
    assert!(turn.profile.topics_mastered.contains(&Topic::new("Rust")));

    // Anchor the history.
    let outcome = sov.save_progress(&signer, &wallet).await.unwrap();
    let anchor = match outcome {
        SaveOutcome::Anchored { anchor, explorer_url } => {
            assert!(explorer_url.contains(anchor.tx_signature.as_str()));
            anchor
        }
        SaveOutcome::NothingToAnchor => panic!("expected an anchor"),
    };
    assert_eq!(anchor.message_count, 2);

    // The profile pointer now tracks the anchored digest.
    let profile = sov.profile(&wallet).await.unwrap().unwrap();
    assert_eq!(profile.current_memory_hash, Some(anchor.memory_hash));
    assert!(profile.last_anchored_at.is_some());

    // Derived summary reflects both the chat table and the anchor log.
    let summary = sov.progress_summary(&wallet).await.unwrap();
    assert_eq!(summary.xp, 10);
    assert_eq!(summary.total_messages, 2);
    assert_eq!(summary.blockchain_anchors, 1);
    assert_eq!(summary.learning_streak, 1);
    assert!(summary.achievements.contains(&AchievementId::FirstMessage));
    assert!(summary.achievements.contains(&AchievementId::FirstAnchor));
}

#[tokio::test]
async fn test_save_with_no_history_is_noop() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[2; 32]);
    let wallet = signer.wallet_address();
    sov.ensure_profile(&wallet).await.unwrap();

    let outcome = sov.save_progress(&signer, &wallet).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::NothingToAnchor));
    // Nothing reached the ledger or the anchor log.
    assert_eq!(sov.ledger().submission_count(), 0);
    assert!(sov.anchor_history(&wallet).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_signature_commits_nothing() {
    let sov = sovereign();
    let real = LocalSigner::from_seed(&[3; 32]);
    let wallet = real.wallet_address();
    let backend = CannedBackend("ok");

    sov.send_message(&backend, &wallet, "hello").await.unwrap();
    let before = sov.profile(&wallet).await.unwrap().unwrap();

    let rejecting = RejectingSigner::new(wallet.clone());
    let err = sov.save_progress(&rejecting, &wallet).await.unwrap_err();
    assert!(matches!(
        err,
        SovereignError::Ledger(LedgerError::AnchorFailed(AnchorFailure::Rejected(_)))
    ));

    // No anchor row, no pointer update, no ledger submission.
    assert!(sov.anchor_history(&wallet).await.unwrap().is_empty());
    let after = sov.profile(&wallet).await.unwrap().unwrap();
    assert_eq!(after.current_memory_hash, before.current_memory_hash);
    assert_eq!(sov.ledger().submission_count(), 0);
}

#[tokio::test]
async fn test_confirmation_timeout_records_nothing() {
    let sov = sovereign_failing_at(FailureMode::ConfirmTimeout);
    let signer = LocalSigner::from_seed(&[4; 32]);
    let wallet = signer.wallet_address();
    let backend = CannedBackend("ok");

    sov.send_message(&backend, &wallet, "hello").await.unwrap();

    let err = sov.save_progress(&signer, &wallet).await.unwrap_err();
    assert!(matches!(
        err,
        SovereignError::Ledger(LedgerError::AnchorFailed(AnchorFailure::Timeout))
    ));
    assert!(sov.anchor_history(&wallet).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_failure_keeps_user_message() {
    let sov = sovereign();
    let wallet = WalletAddress::new("walletA");

    let err = sov.send_message(&DownBackend, &wallet, "hello").await.unwrap_err();
    assert!(matches!(err, SovereignError::Backend(_)));

    // The user message and its XP survive; only the reply is missing.
    let profile = sov.profile(&wallet).await.unwrap().unwrap();
    assert_eq!(profile.xp, 10);
    let messages = sov.store().recent_messages(&wallet, 10).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
}

#[tokio::test]
async fn test_same_history_same_digest() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[5; 32]);
    let wallet = signer.wallet_address();
    let backend = CannedBackend("ok");

    sov.send_message(&backend, &wallet, "hello").await.unwrap();

    let first = sov.save_progress(&signer, &wallet).await.unwrap();
    let second = sov.save_progress(&signer, &wallet).await.unwrap();

    let (a, b) = match (first, second) {
        (SaveOutcome::Anchored { anchor: a, .. }, SaveOutcome::Anchored { anchor: b, .. }) => (a, b),
        other => panic!("expected two anchors, got {other:?}"),
    };
    // Unchanged history digests to the same hash, under fresh signatures.
    assert_eq!(a.memory_hash, b.memory_hash);
    assert_ne!(a.tx_signature, b.tx_signature);
    assert_eq!(sov.anchor_history(&wallet).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_mint_achievement_anchors_metadata_hash() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[6; 32]);
    let wallet = signer.wallet_address();
    let backend = CannedBackend("ok");

    sov.send_message(&backend, &wallet, "hello").await.unwrap();

    let mint = sov
        .mint_achievement(&signer, &wallet, "first_message")
        .await
        .unwrap();
    assert_eq!(mint.metadata.symbol, "SOVACH");
    assert_eq!(mint.metadata.name, "First Steps");
    assert!(mint.explorer_url.contains(mint.signature.as_str()));

    // The on-chain memo commits to the metadata hash.
    let submitted = sov.ledger().submitted();
    assert_eq!(submitted.len(), 1);
    let record: CommitmentRecord =
        serde_json::from_str(&submitted[0].transaction.memo).unwrap();
    match record {
        CommitmentRecord::ProgressCredential { metadata_hash, symbol, .. } => {
            assert_eq!(metadata_hash, mint.metadata_hash);
            assert_eq!(symbol, "SOVACH");
        }
        other => panic!("unexpected record: {other:?}"),
    }
}

#[tokio::test]
async fn test_mint_unknown_achievement_fails_before_ledger() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[7; 32]);
    let wallet = signer.wallet_address();
    sov.ensure_profile(&wallet).await.unwrap();

    let err = sov
        .mint_achievement(&signer, &wallet, "speedrun_any_percent")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SovereignError::Core(CoreError::UnknownAchievement(_))
    ));
    assert_eq!(sov.ledger().submission_count(), 0);
}

#[tokio::test]
async fn test_mint_progress_credential_snapshot() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[8; 32]);
    let wallet = signer.wallet_address();
    let backend = CannedBackend("ok");

    for i in 0..3 {
        sov.send_message(&backend, &wallet, &format!("question {i}"))
            .await
            .unwrap();
    }
    sov.save_progress(&signer, &wallet).await.unwrap();

    let mint = sov.mint_progress_credential(&signer, &wallet).await.unwrap();
    assert_eq!(mint.metadata.symbol, "SOVPROG");

    // Total Messages reflects the anchored record (3 questions + 3 replies).
    let total = &mint.metadata.attributes[3];
    assert_eq!(total.trait_type, "Total Messages");
    assert_eq!(total.value, AttributeValue::Number(6));
    let anchors = &mint.metadata.attributes[6];
    assert_eq!(anchors.trait_type, "Blockchain Anchors");
    assert_eq!(anchors.value, AttributeValue::Number(1));
}

#[tokio::test]
async fn test_operations_require_profile() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[9; 32]);
    let wallet = WalletAddress::new("never-onboarded");

    let err = sov.progress_summary(&wallet).await.unwrap_err();
    assert!(matches!(
        err,
        SovereignError::Store(StoreError::ProfileNotFound(_))
    ));

    let err = sov
        .mint_achievement(&signer, &wallet, "first_message")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SovereignError::Store(StoreError::ProfileNotFound(_))
    ));
}

#[tokio::test]
async fn test_wallets_are_isolated() {
    let sov = sovereign();
    let backend = CannedBackend("ok");
    let signer_a = LocalSigner::from_seed(&[10; 32]);
    let signer_b = LocalSigner::from_seed(&[11; 32]);
    let wallet_a = signer_a.wallet_address();
    let wallet_b = signer_b.wallet_address();

    sov.send_message(&backend, &wallet_a, "hello from a").await.unwrap();
    sov.send_message(&backend, &wallet_b, "hello from b").await.unwrap();
    sov.save_progress(&signer_a, &wallet_a).await.unwrap();

    let summary_a = sov.progress_summary(&wallet_a).await.unwrap();
    let summary_b = sov.progress_summary(&wallet_b).await.unwrap();
    assert_eq!(summary_a.blockchain_anchors, 1);
    assert_eq!(summary_b.blockchain_anchors, 0);
    assert_eq!(summary_b.total_messages, 2);
}

#[tokio::test]
async fn test_concurrent_saves_serialize_per_wallet() {
    let sov = std::sync::Arc::new(sovereign());
    let signer = std::sync::Arc::new(LocalSigner::from_seed(&[12; 32]));
    let wallet = signer.wallet_address();
    let backend = CannedBackend("ok");

    sov.send_message(&backend, &wallet, "hello").await.unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let sov = sov.clone();
            let signer = signer.clone();
            let wallet = wallet.clone();
            tokio::spawn(async move { sov.save_progress(signer.as_ref(), &wallet).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Every save ran to completion and appended exactly one anchor.
    let summary = sov.progress_summary(&wallet).await.unwrap();
    assert_eq!(summary.blockchain_anchors, 4);
    assert_eq!(sov.ledger().submission_count(), 4);
}

#[tokio::test]
async fn test_estimate_and_verify() {
    let sov = sovereign();
    let signer = LocalSigner::from_seed(&[13; 32]);
    let wallet = signer.wallet_address();
    let backend = CannedBackend("ok");

    let estimate = sov.estimate_anchor_cost().await;
    assert_eq!(estimate.fee_units, 5_000);
    assert_eq!(estimate.native_cost, 0.000005);

    sov.send_message(&backend, &wallet, "hello").await.unwrap();
    let outcome = sov.save_progress(&signer, &wallet).await.unwrap();
    let anchor = match outcome {
        SaveOutcome::Anchored { anchor, .. } => anchor,
        SaveOutcome::NothingToAnchor => panic!("expected an anchor"),
    };

    let verification = sov.verify_anchor(&anchor.tx_signature).await;
    assert!(verification.verified);

    let missing = sov
        .verify_anchor(&sovereign_core::TxSignature::new("no-such-signature"))
        .await;
    assert!(!missing.verified);
}
