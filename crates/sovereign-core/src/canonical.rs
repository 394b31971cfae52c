//! Canonical encoding of message sequences.
//!
//! The digest that gets anchored on-chain is computed over these bytes, so
//! the encoding must be reproducible bit-for-bit across platforms:
//!
//! - Messages sorted by `created_at` ascending (stable sort; ties keep the
//!   relative input order)
//! - Each message reduced to the triple `(role, content, timestamp)` with
//!   fixed field order
//! - Compact JSON, no whitespace variance
//! - Timestamps rendered as RFC 3339 UTC with millisecond precision

use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Message;

/// The canonical triple for one message. Field order is part of the format.
#[derive(Serialize)]
struct CanonicalMessage<'a> {
    role: &'a str,
    content: &'a str,
    timestamp: String,
}

/// Encode a message sequence to canonical bytes.
///
/// The result depends only on the message *set*: any permutation of the same
/// messages yields the same bytes.
pub fn canonical_message_bytes(messages: &[Message]) -> Result<Vec<u8>, CoreError> {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    // Stable: equal timestamps keep insertion order.
    ordered.sort_by_key(|m| m.created_at);

    let canonical: Vec<CanonicalMessage<'_>> = ordered
        .iter()
        .map(|m| CanonicalMessage {
            role: m.role.as_str(),
            content: &m.content,
            timestamp: m.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
        .collect();

    serde_json::to_vec(&canonical).map_err(|e| CoreError::EncodingError(e.to_string()))
}
