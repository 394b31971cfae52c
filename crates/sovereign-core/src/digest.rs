//! HistoryDigest: deterministic digest of a conversation.

use chrono::Utc;

use crate::canonical::canonical_message_bytes;
use crate::error::CoreError;
use crate::types::{ChatHash, Message, Sha256Hash};

/// Digest a message sequence into a [`ChatHash`].
///
/// The hash is SHA-256 over the canonical encoding and is independent of the
/// input order. `message_count` is the input length; duplicates are not
/// deduplicated. The `timestamp` records when the digest was taken and does
/// not feed into the hash.
pub fn digest(messages: &[Message]) -> Result<ChatHash, CoreError> {
    let bytes = canonical_message_bytes(messages)?;
    Ok(ChatHash {
        hash: Sha256Hash::hash(&bytes),
        message_count: messages.len() as u32,
        timestamp: Utc::now(),
    })
}
