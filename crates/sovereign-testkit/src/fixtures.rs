//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use chrono::{DateTime, TimeZone, Utc};

use sovereign_core::{Anchor, Message, Role, Sha256Hash, TxSignature, WalletAddress};
use sovereign_ledger::LocalSigner;
use sovereign_store::MemoryStore;

use crate::ledger::MockLedger;

/// Base timestamp all fixture times are offsets from.
pub const BASE_MILLIS: i64 = 1_700_000_000_000;

/// A test fixture with a seeded signer, memory store, and mock ledger.
pub struct TestFixture {
    pub signer: LocalSigner,
    pub store: MemoryStore,
    pub ledger: MockLedger,
}

impl TestFixture {
    /// Create a fixture with a random signing key.
    pub fn new() -> Self {
        Self {
            signer: LocalSigner::generate(),
            store: MemoryStore::new(),
            ledger: MockLedger::new(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            signer: LocalSigner::from_seed(&seed),
            store: MemoryStore::new(),
            ledger: MockLedger::new(),
        }
    }

    /// The fixture signer's wallet address.
    pub fn wallet(&self) -> WalletAddress {
        self.signer.wallet_address()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixture timestamp `offset_ms` after the base.
pub fn ts(offset_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(BASE_MILLIS + offset_ms)
        .single()
        .unwrap_or_default()
}

/// A user message at the given offset.
pub fn user_message(content: &str, offset_ms: i64) -> Message {
    Message::new(Role::User, content, ts(offset_ms))
}

/// An assistant message at the given offset.
pub fn assistant_message(content: &str, offset_ms: i64) -> Message {
    Message::new(Role::Assistant, content, ts(offset_ms))
}

/// An alternating user/assistant conversation with `turns` exchanges,
/// one second apart.
pub fn conversation(turns: usize) -> Vec<Message> {
    (0..turns)
        .flat_map(|i| {
            let at = i as i64 * 2_000;
            [
                user_message(&format!("question {i}"), at),
                assistant_message(&format!("answer {i}"), at + 1_000),
            ]
        })
        .collect()
}

/// A confirmed anchor for `wallet` at the given offset.
pub fn anchor(wallet: &WalletAddress, id: i64, message_count: u32, offset_ms: i64) -> Anchor {
    Anchor {
        id,
        wallet_address: wallet.clone(),
        memory_hash: Sha256Hash::hash(format!("history-{id}").as_bytes()),
        tx_signature: TxSignature::new(format!("fixture-sig-{id}")),
        message_count,
        anchored_at: ts(offset_ms),
    }
}

/// Multiple independent fixtures for multi-wallet tests.
pub fn multi_wallet_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_alternates_roles() {
        let messages = conversation(3);
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[0].created_at < messages[1].created_at);
    }

    #[test]
    fn test_seeded_fixtures_deterministic() {
        let a = TestFixture::with_seed([7; 32]);
        let b = TestFixture::with_seed([7; 32]);
        assert_eq!(a.wallet(), b.wallet());
    }

    #[test]
    fn test_multi_wallet_fixtures_distinct() {
        let fixtures = multi_wallet_fixtures(3);
        assert_ne!(fixtures[0].wallet(), fixtures[1].wallet());
        assert_ne!(fixtures[1].wallet(), fixtures[2].wallet());
    }
}
