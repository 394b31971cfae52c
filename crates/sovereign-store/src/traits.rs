//! Store trait: the abstract interface for progress persistence.
//!
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use sovereign_core::{Anchor, Message, Profile, Sha256Hash, Topic, TxSignature, WalletAddress};

use crate::error::Result;

/// The Store trait: async interface for profiles, chats, and anchors.
///
/// All reads filter by wallet address; wallets never share state. Mutators
/// fail with [`StoreError::ProfileNotFound`] when the wallet has no profile.
///
/// [`StoreError::ProfileNotFound`]: crate::error::StoreError::ProfileNotFound
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Profile Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a fresh level-1 profile. Fails `ProfileExists` when one exists.
    async fn create_profile(&self, wallet: &WalletAddress) -> Result<Profile>;

    /// Get a profile, or `None` when the wallet is not onboarded.
    async fn get_profile(&self, wallet: &WalletAddress) -> Result<Option<Profile>>;

    /// Read-modify-write XP, recomputing `level` from the new total in the
    /// same atomic update. Returns the updated profile.
    async fn award_xp(&self, wallet: &WalletAddress, delta: u64) -> Result<Profile>;

    /// Set the current memory-hash pointer and `last_anchored_at`.
    /// Last-write-wins; no merge.
    async fn update_memory_pointer(
        &self,
        wallet: &WalletAddress,
        hash: &Sha256Hash,
        anchored_at: DateTime<Utc>,
    ) -> Result<Profile>;

    /// Union `topics` into `topics_mastered`. Idempotent: re-adding a topic
    /// is a no-op.
    async fn merge_topics(
        &self,
        wallet: &WalletAddress,
        topics: &BTreeSet<Topic>,
    ) -> Result<Profile>;

    // ─────────────────────────────────────────────────────────────────────────
    // Chat Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a chat message. Messages are immutable once stored.
    async fn insert_message(&self, wallet: &WalletAddress, message: &Message) -> Result<()>;

    /// The most recent `limit` messages, returned oldest-first (ready for
    /// hashing and webhook history).
    async fn recent_messages(&self, wallet: &WalletAddress, limit: u32) -> Result<Vec<Message>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Anchor Operations (append-only)
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new anchor row. Existing anchors are never touched.
    async fn record_anchor(
        &self,
        wallet: &WalletAddress,
        hash: &Sha256Hash,
        signature: &TxSignature,
        message_count: u32,
        anchored_at: DateTime<Utc>,
    ) -> Result<Anchor>;

    /// The most recent `limit` anchors, newest first (display order).
    async fn anchors(&self, wallet: &WalletAddress, limit: u32) -> Result<Vec<Anchor>>;

    /// The single most recent anchor, if any.
    async fn latest_anchor(&self, wallet: &WalletAddress) -> Result<Option<Anchor>>;
}
