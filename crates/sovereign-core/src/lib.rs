//! # Sovereign Core
//!
//! Pure primitives for the Sovereign learning-progress anchoring subsystem:
//! message digests, the progress engine, and credential metadata.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over conversation history and per-wallet progress state.
//!
//! ## Key Types
//!
//! - [`Message`] - A single chat message (role, content, created_at)
//! - [`ChatHash`] - Deterministic SHA-256 digest of a message sequence
//! - [`Anchor`] - A confirmed on-chain commitment of a [`ChatHash`]
//! - [`Profile`] - Per-wallet XP / level / topic state
//! - [`ProgressSummary`] - Derived view composed by the progress engine
//! - [`CredentialMetadata`] - Versioned NFT-style metadata document
//!
//! ## Determinism
//!
//! Message sequences are canonicalized (sorted by `created_at`, fixed field
//! order, compact JSON) before hashing. See [`canonical`]. The same message
//! set always produces the same digest, regardless of input order.

pub mod canonical;
pub mod credential;
pub mod digest;
pub mod error;
pub mod progress;
pub mod topics;
pub mod types;

pub use canonical::canonical_message_bytes;
pub use credential::{
    achievement_definition, build_achievement_credential, build_progress_credential,
    metadata_bytes, metadata_hash, AchievementDefinition, Attribute, AttributeValue,
    CredentialMetadata,
};
pub use digest::digest;
pub use error::CoreError;
pub use progress::{
    achievements, level_for_xp, level_progress_percent, rank, streak, summary, ProgressSummary,
    Rank,
};
pub use topics::extract_topics;
pub use types::{
    AchievementId, Anchor, ChatHash, Message, Profile, Role, Sha256Hash, Topic, TxSignature,
    WalletAddress,
};
