//! Golden digest vectors.
//!
//! Known message sets with their expected canonical digests, for verifying
//! that the chat-history digest stays stable across versions and platforms.
//! Any implementation that anchors or verifies these histories must produce
//! exactly these hashes.

use sovereign_core::{digest, Message, Role};

use crate::fixtures::ts;

/// One known message set and its expected digest.
pub struct GoldenVector {
    pub name: &'static str,
    pub messages: Vec<Message>,
    /// Expected SHA-256 of the canonical encoding, lowercase hex.
    pub expected_hex: &'static str,
    pub expected_count: u32,
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty",
            messages: vec![],
            // SHA-256 of "[]"
            expected_hex: "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945",
            expected_count: 0,
        },
        GoldenVector {
            name: "single-user-message",
            messages: vec![Message::new(Role::User, "hello", ts(0))],
            expected_hex: "28cc196be5190827a388302db4350dbc3bdc901eaee28450a563648e1e0f4c6d",
            expected_count: 1,
        },
        GoldenVector {
            name: "one-exchange",
            messages: vec![
                Message::new(
                    Role::User,
                    "What is ownership in Rust?",
                    "2024-01-01T10:00:00Z".parse().unwrap(),
                ),
                Message::new(
                    Role::Assistant,
                    "Ownership is the set of rules that govern how memory is managed.",
                    "2024-01-01T10:00:05Z".parse().unwrap(),
                ),
            ],
            expected_hex: "a4fd989951f13ebf33b73791eac7c484d093ab2afd2dcd6c2b89f3781f3e7f84",
            expected_count: 2,
        },
        GoldenVector {
            name: "escapes-and-unicode",
            messages: vec![Message::new(
                Role::User,
                "naive \"quotes\" and unicode: é",
                "2024-06-15T08:30:00Z".parse().unwrap(),
            )],
            expected_hex: "a3e40411a9903ea3250f6a37bb537b7b018d584386cfd5a30a6f89765dc1992a",
            expected_count: 1,
        },
    ]
}

/// Verify every vector, returning the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let chat_hash =
            digest(&vector.messages).map_err(|e| format!("{}: digest failed: {e}", vector.name))?;
        if chat_hash.hash.to_hex() != vector.expected_hex {
            return Err(format!(
                "{}: expected {}, got {}",
                vector.name,
                vector.expected_hex,
                chat_hash.hash.to_hex()
            ));
        }
        if chat_hash.message_count != vector.expected_count {
            return Err(format!(
                "{}: expected count {}, got {}",
                vector.name, vector.expected_count, chat_hash.message_count
            ));
        }
    }
    Ok(())
}
