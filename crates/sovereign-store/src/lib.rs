//! # Sovereign Store
//!
//! Persistence for Sovereign progress state: profiles, chat history, and the
//! append-only anchor log.
//!
//! ## Overview
//!
//! Storage is abstracted behind the [`Store`] trait so the facade can run
//! against SQLite in production and an in-memory store in tests.
//!
//! ## Key Types
//!
//! - [`Store`] - the async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - in-memory storage for tests
//!
//! ## Design Notes
//!
//! - **Append-only anchors**: `record_anchor` only inserts; anchors are never
//!   updated or deleted (audit trail).
//! - **Atomic XP**: `award_xp` recomputes the level from the new XP inside a
//!   single UPDATE, so `xp` and `level` are never observed inconsistent.
//! - **Explicit onboarding**: every mutator fails with `ProfileNotFound` when
//!   the wallet has no profile; `create_profile` is a separate call.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
