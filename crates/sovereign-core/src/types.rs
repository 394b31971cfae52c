//! Strong type definitions for the Sovereign subsystem.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::CoreError;

/// A wallet address: the base58-encoded public identity that owns a profile,
/// its chat history, and its anchors.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address from its base58 string form.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wallet({})", self.0)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A ledger transaction signature (base58), returned on submission and used
/// to look the transaction up later.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxSignature(String);

impl TxSignature {
    /// Create from the base58 string form.
    pub fn new(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }

    /// Get the signature string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Back off to a char boundary; signatures are base58 in practice but
        // the type does not enforce ASCII.
        let mut end = self.0.len().min(16);
        while !self.0.is_char_boundary(end) {
            end -= 1;
        }
        write!(f, "TxSig({}...)", &self.0[..end])
    }
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte SHA-256 hash.
///
/// Serializes as lowercase hex, matching the on-chain commitment format.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(data);
        Self(digest.into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidHash(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CoreError::InvalidHash(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero hash (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Sha256Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// The lowercase wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse from the storage form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

/// A single chat message. Immutable once persisted.
///
/// Ordering key is `created_at`; ties keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at,
        }
    }
}

/// The deterministic digest of a message sequence.
///
/// `message_count` reflects the input length, not a deduplicated length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHash {
    pub hash: Sha256Hash,
    pub message_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// A confirmed, ledger-committed record binding a chat digest to a point in
/// time. Append-only: anchors are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: i64,
    pub wallet_address: WalletAddress,
    pub memory_hash: Sha256Hash,
    pub tx_signature: TxSignature,
    pub message_count: u32,
    pub anchored_at: DateTime<Utc>,
}

/// A mastered topic name, e.g. "Rust" or "Linear Algebra".
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Per-wallet progress state.
///
/// Invariant: `level == xp / 1000 + 1` after every XP mutation. Level is
/// always recomputed alongside XP, never written independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub wallet_address: WalletAddress,
    pub xp: u64,
    pub level: u32,
    pub topics_mastered: BTreeSet<Topic>,
    pub current_memory_hash: Option<Sha256Hash>,
    pub last_anchored_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// A fresh level-1 profile with no history.
    pub fn new(wallet_address: WalletAddress) -> Self {
        Self {
            wallet_address,
            xp: 0,
            level: 1,
            topics_mastered: BTreeSet::new(),
            current_memory_hash: None,
            last_anchored_at: None,
        }
    }
}

/// An unlockable achievement.
///
/// Achievements are monotonic: the unlock predicates only depend on counters
/// that never decrease, so an unlocked achievement stays unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstMessage,
    FirstAnchor,
    Streak7,
    Messages100,
    Level10,
    MasterRank,
}

impl AchievementId {
    /// All registered achievement ids.
    pub const ALL: [AchievementId; 6] = [
        AchievementId::FirstMessage,
        AchievementId::FirstAnchor,
        AchievementId::Streak7,
        AchievementId::Messages100,
        AchievementId::Level10,
        AchievementId::MasterRank,
    ];

    /// The snake_case wire form, e.g. `first_message`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstMessage => "first_message",
            AchievementId::FirstAnchor => "first_anchor",
            AchievementId::Streak7 => "streak_7",
            AchievementId::Messages100 => "messages_100",
            AchievementId::Level10 => "level_10",
            AchievementId::MasterRank => "master_rank",
        }
    }

    /// Parse from the wire form. Unknown ids are a caller error.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "first_message" => Ok(AchievementId::FirstMessage),
            "first_anchor" => Ok(AchievementId::FirstAnchor),
            "streak_7" => Ok(AchievementId::Streak7),
            "messages_100" => Ok(AchievementId::Messages100),
            "level_10" => Ok(AchievementId::Level10),
            "master_rank" => Ok(AchievementId::MasterRank),
            other => Err(CoreError::UnknownAchievement(other.to_string())),
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
