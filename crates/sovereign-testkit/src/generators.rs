//! Proptest generators for property-based testing.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use sovereign_core::{Anchor, Message, Role, Sha256Hash, Topic, TxSignature, WalletAddress};

/// Generate a role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant)]
}

/// Generate a base58-looking wallet address.
pub fn wallet_address() -> impl Strategy<Value = WalletAddress> {
    "[1-9A-HJ-NP-Za-km-z]{32,44}".prop_map(WalletAddress::new)
}

/// Generate a transaction signature string.
pub fn tx_signature() -> impl Strategy<Value = TxSignature> {
    "[1-9A-HJ-NP-Za-km-z]{64,88}".prop_map(TxSignature::new)
}

/// Generate a random hash.
pub fn sha256_hash() -> impl Strategy<Value = Sha256Hash> {
    any::<[u8; 32]>().prop_map(Sha256Hash::from_bytes)
}

/// Generate a topic name.
pub fn topic() -> impl Strategy<Value = Topic> {
    "[A-Z][a-z]{2,15}".prop_map(Topic::new)
}

/// Generate a timestamp within a sane range (2001 through 2033, millisecond
/// precision).
pub fn timestamp() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    (1_000_000_000_000i64..2_000_000_000_000i64)
        .prop_map(|ms| Utc.timestamp_millis_opt(ms).single().unwrap_or_default())
}

/// Generate a single message.
pub fn message() -> impl Strategy<Value = Message> {
    (role(), ".{0,200}", timestamp())
        .prop_map(|(role, content, created_at)| Message::new(role, content, created_at))
}

/// Generate up to `max` messages.
pub fn messages(max: usize) -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message(), 0..=max)
}

/// Generate an anchor for an arbitrary wallet.
pub fn anchor() -> impl Strategy<Value = Anchor> {
    (
        1i64..100_000,
        wallet_address(),
        sha256_hash(),
        tx_signature(),
        0u32..5_000,
        timestamp(),
    )
        .prop_map(
            |(id, wallet_address, memory_hash, tx_signature, message_count, anchored_at)| Anchor {
                id,
                wallet_address,
                memory_hash,
                tx_signature,
                message_count,
                anchored_at,
            },
        )
}

/// Generate up to `max` anchors.
pub fn anchors(max: usize) -> impl Strategy<Value = Vec<Anchor>> {
    prop::collection::vec(anchor(), 0..=max)
}
