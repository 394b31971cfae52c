//! # Sovereign
//!
//! Unified API for the Sovereign learning-progress subsystem: chat through a
//! configurable backend, deterministic chat-history digests anchored to a
//! ledger, a recomputed-on-demand progress view, and verifiable credential
//! metadata.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sovereign::{Sovereign, SovereignConfig};
//! use sovereign_ledger::LocalSigner;
//! use sovereign_store::SqliteStore;
//!
//! # async fn example(ledger: impl sovereign_ledger::LedgerClient) -> anyhow::Result<()> {
//! let store = SqliteStore::open("sovereign.db")?;
//! let sovereign = Sovereign::new(store, ledger, SovereignConfig::default());
//!
//! let signer = LocalSigner::generate();
//! let wallet = signer.wallet_address();
//! sovereign.ensure_profile(&wallet).await?;
//! let outcome = sovereign.save_progress(&signer, &wallet).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod sovereign;
pub mod webhook;

pub use error::{Result, SovereignError};
pub use sovereign::{
    ChatTurn, MintResult, SaveOutcome, Sovereign, SovereignConfig, DEFAULT_SYSTEM_PROMPT,
};
pub use webhook::{BackendError, ChatBackend, ChatRequest, WebhookBackend, WireMessage};
