//! # Sovereign Testkit
//!
//! Testing utilities for the Sovereign subsystem.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: known message sets with expected digests, for
//!   cross-version verification
//! - **Mock ledger**: a scriptable in-memory [`ledger::MockLedger`] plus
//!   failing signers
//! - **Generators**: proptest strategies for property-based testing
//! - **Fixtures**: seeded signers, stores, and conversation builders
//!
//! ## Golden Vectors
//!
//! ```rust
//! use sovereign_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Fixtures
//!
//! ```rust
//! use sovereign_testkit::fixtures::{conversation, TestFixture};
//!
//! let fixture = TestFixture::with_seed([1; 32]);
//! let history = conversation(5);
//! ```

pub mod fixtures;
pub mod generators;
pub mod ledger;
pub mod vectors;

pub use fixtures::{
    anchor, assistant_message, conversation, multi_wallet_fixtures, ts, user_message, TestFixture,
};
pub use ledger::{FailureMode, MockLedger, RejectingSigner, UnavailableSigner};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
