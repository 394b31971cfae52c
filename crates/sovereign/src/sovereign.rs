//! The Sovereign facade: chat, anchoring, progress, and credential minting
//! behind one API.
//!
//! Composes the pure core, the ledger protocol, and the store. All
//! per-wallet mutation funnels through a per-wallet async lock so concurrent
//! saves for the same wallet serialize instead of double-anchoring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use sovereign_core::{
    build_achievement_credential, build_progress_credential, digest, extract_topics,
    metadata_hash, AchievementId, Anchor, CredentialMetadata, Message, Profile,
    ProgressSummary, Role, Sha256Hash, TxSignature, WalletAddress,
};
use sovereign_ledger::{
    anchor_commitment, estimate_cost, explorer_url, verify, CommitmentRecord, CostEstimate,
    LedgerClient, Signer, Verification,
};
use sovereign_store::{Store, StoreError};

use crate::error::{Result, SovereignError};
use crate::webhook::{ChatBackend, ChatRequest};

/// Default tutoring prompt sent with every chat request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Sovereign AI, a personal learning companion. \
Teach clearly, adapt to the learner's level, and encourage steady progress.";

/// Configuration for the Sovereign facade.
#[derive(Debug, Clone)]
pub struct SovereignConfig {
    /// How many recent messages accompany a chat request.
    pub history_limit: u32,
    /// How many recent messages go into a digest or summary.
    pub digest_limit: u32,
    /// How many anchors the display list returns.
    pub anchor_display_limit: u32,
    /// XP awarded per user message.
    pub xp_per_message: u64,
    /// System prompt for the chat backend.
    pub system_prompt: String,
}

impl Default for SovereignConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            digest_limit: 1000,
            anchor_display_limit: 10,
            xp_per_message: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Outcome of a save: either nothing needed anchoring, or a confirmed anchor.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// No messages in history; nothing was committed anywhere.
    NothingToAnchor,
    /// A digest was anchored and recorded.
    Anchored {
        anchor: Anchor,
        explorer_url: String,
    },
}

/// Result of minting a credential: the metadata document plus the on-chain
/// commitment of its hash.
#[derive(Debug, Clone)]
pub struct MintResult {
    pub signature: TxSignature,
    pub explorer_url: String,
    pub metadata: CredentialMetadata,
    pub metadata_hash: Sha256Hash,
}

/// One completed chat exchange.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub reply: Message,
    pub profile: Profile,
}

/// The main Sovereign struct.
///
/// Provides a unified API for:
/// - Chatting through the configured backend
/// - Anchoring chat-history digests to the ledger
/// - Querying derived progress
/// - Minting progress and achievement credentials
pub struct Sovereign<S: Store, L: LedgerClient> {
    store: Arc<S>,
    ledger: Arc<L>,
    config: SovereignConfig,
    /// One async lock per wallet; serializes anchoring per wallet.
    wallet_locks: Mutex<HashMap<WalletAddress, Arc<AsyncMutex<()>>>>,
}

impl<S: Store, L: LedgerClient> Sovereign<S, L> {
    /// Create a new facade instance.
    pub fn new(store: S, ledger: L, config: SovereignConfig) -> Self {
        Self {
            store: Arc::new(store),
            ledger: Arc::new(ledger),
            config,
            wallet_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the ledger client reference.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    fn wallet_lock(&self, wallet: &WalletAddress) -> Result<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .wallet_locks
            .lock()
            .map_err(|e| SovereignError::Internal(format!("lock poisoned: {}", e)))?;
        Ok(locks.entry(wallet.clone()).or_default().clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profile Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the profile for a wallet, if onboarded.
    pub async fn profile(&self, wallet: &WalletAddress) -> Result<Option<Profile>> {
        Ok(self.store.get_profile(wallet).await?)
    }

    /// Get the profile for a wallet, creating it on first contact.
    pub async fn ensure_profile(&self, wallet: &WalletAddress) -> Result<Profile> {
        if let Some(profile) = self.store.get_profile(wallet).await? {
            return Ok(profile);
        }
        match self.store.create_profile(wallet).await {
            Ok(profile) => {
                info!(%wallet, "created profile");
                Ok(profile)
            }
            // Lost a create race; the profile exists now.
            Err(StoreError::ProfileExists(_)) => {
                let profile = self.store.get_profile(wallet).await?;
                profile.ok_or_else(|| {
                    SovereignError::Internal("profile vanished after create race".to_string())
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one chat exchange: persist the user message, award XP, harvest
    /// topics, get a reply from the backend, and persist the reply.
    pub async fn send_message(
        &self,
        backend: &dyn ChatBackend,
        wallet: &WalletAddress,
        content: &str,
    ) -> Result<ChatTurn> {
        self.ensure_profile(wallet).await?;

        // History excludes the message being sent.
        let history = self
            .store
            .recent_messages(wallet, self.config.history_limit)
            .await?;

        let now = Utc::now();
        let user_message = Message::new(Role::User, content, now);
        self.store.insert_message(wallet, &user_message).await?;

        let mut profile = self
            .store
            .award_xp(wallet, self.config.xp_per_message)
            .await?;

        let topics = extract_topics(std::slice::from_ref(&user_message));
        if !topics.is_empty() {
            debug!(%wallet, count = topics.len(), "merging detected topics");
            profile = self.store.merge_topics(wallet, &topics).await?;
        }

        let request = ChatRequest::new(
            wallet,
            self.config.system_prompt.clone(),
            &history,
            content,
            now,
        );
        let reply_text = backend.complete(&request).await?;

        let reply = Message::new(Role::Assistant, reply_text, Utc::now());
        self.store.insert_message(wallet, &reply).await?;

        Ok(ChatTurn { reply, profile })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Anchor Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Digest the wallet's recent history and anchor it to the ledger.
    ///
    /// With no history this is a no-op; nothing reaches the ledger or the
    /// store. On anchor failure nothing is recorded either, so the next
    /// attempt re-digests current state from scratch.
    pub async fn save_progress(
        &self,
        signer: &dyn Signer,
        wallet: &WalletAddress,
    ) -> Result<SaveOutcome> {
        let lock = self.wallet_lock(wallet)?;
        let _guard = lock.lock().await;

        let messages = self
            .store
            .recent_messages(wallet, self.config.digest_limit)
            .await?;
        if messages.is_empty() {
            debug!(%wallet, "no messages, skipping anchor");
            return Ok(SaveOutcome::NothingToAnchor);
        }

        let chat_hash = digest(&messages)?;
        let result = sovereign_ledger::anchor(signer, self.ledger.as_ref(), &chat_hash).await?;

        let anchor = self
            .store
            .record_anchor(
                wallet,
                &chat_hash.hash,
                &result.signature,
                chat_hash.message_count,
                result.timestamp,
            )
            .await?;
        self.store
            .update_memory_pointer(wallet, &chat_hash.hash, result.timestamp)
            .await?;

        info!(%wallet, signature = %anchor.tx_signature, "progress anchored");
        Ok(SaveOutcome::Anchored {
            anchor,
            explorer_url: result.explorer_url,
        })
    }

    /// The wallet's recent anchors, newest first, for display.
    pub async fn anchor_history(&self, wallet: &WalletAddress) -> Result<Vec<Anchor>> {
        Ok(self
            .store
            .anchors(wallet, self.config.anchor_display_limit)
            .await?)
    }

    /// Estimate the ledger cost of one anchor.
    pub async fn estimate_anchor_cost(&self) -> CostEstimate {
        estimate_cost(self.ledger.as_ref()).await
    }

    /// Check whether an anchor's transaction is visible on the ledger.
    pub async fn verify_anchor(&self, signature: &TxSignature) -> Verification {
        verify(self.ledger.as_ref(), signature).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Progress Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Derived progress view for a wallet. Requires an onboarded profile.
    pub async fn progress_summary(&self, wallet: &WalletAddress) -> Result<ProgressSummary> {
        let profile = self
            .store
            .get_profile(wallet)
            .await?
            .ok_or_else(|| StoreError::ProfileNotFound(wallet.as_str().to_string()))?;
        let messages = self
            .store
            .recent_messages(wallet, self.config.digest_limit)
            .await?;
        let anchors = self.store.anchors(wallet, self.config.digest_limit).await?;

        Ok(sovereign_core::summary(&profile, &messages, &anchors))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credential Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint an achievement credential: build the metadata document and anchor
    /// its hash to the ledger.
    pub async fn mint_achievement(
        &self,
        signer: &dyn Signer,
        wallet: &WalletAddress,
        achievement_id: &str,
    ) -> Result<MintResult> {
        let id = AchievementId::parse(achievement_id)?;
        let profile = self
            .store
            .get_profile(wallet)
            .await?
            .ok_or_else(|| StoreError::ProfileNotFound(wallet.as_str().to_string()))?;

        let metadata = build_achievement_credential(id, &profile, Utc::now());
        self.mint(signer, wallet, metadata).await
    }

    /// Mint a progress-snapshot credential from the wallet's anchored record.
    pub async fn mint_progress_credential(
        &self,
        signer: &dyn Signer,
        wallet: &WalletAddress,
    ) -> Result<MintResult> {
        let profile = self
            .store
            .get_profile(wallet)
            .await?
            .ok_or_else(|| StoreError::ProfileNotFound(wallet.as_str().to_string()))?;
        let anchors = self.store.anchors(wallet, self.config.digest_limit).await?;

        let metadata = build_progress_credential(&profile, &anchors);
        self.mint(signer, wallet, metadata).await
    }

    async fn mint(
        &self,
        signer: &dyn Signer,
        wallet: &WalletAddress,
        metadata: CredentialMetadata,
    ) -> Result<MintResult> {
        let hash = metadata_hash(&metadata)?;
        let record = CommitmentRecord::ProgressCredential {
            metadata_hash: hash,
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };

        let result = anchor_commitment(signer, self.ledger.as_ref(), &record).await?;
        info!(%wallet, name = %metadata.name, signature = %result.signature, "credential minted");

        Ok(MintResult {
            explorer_url: explorer_url(&result.signature),
            signature: result.signature,
            metadata,
            metadata_hash: hash,
        })
    }
}
