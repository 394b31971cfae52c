//! Signer: public identity plus transaction-signing capability.
//!
//! Private key material never crosses this boundary; the subsystem only ever
//! sees an address and a `sign` call. A wallet-backed implementation should
//! map user refusal to `AnchorFailure::Rejected`.

use async_trait::async_trait;
use ed25519_dalek::{Signer as DalekSigner, SigningKey};
use std::fmt;

use sovereign_core::{TxSignature, WalletAddress};

use crate::error::Result;
use crate::transaction::{SignedTransaction, Transaction};

/// A transaction signer with a stable public identity.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The signer's wallet address. Fails `SignerUnavailable` when no
    /// signing identity is connected.
    fn address(&self) -> Result<WalletAddress>;

    /// Sign a transaction. May suspend (hardware wallets, user prompts).
    async fn sign(&self, transaction: &Transaction) -> Result<SignedTransaction>;
}

/// An in-process Ed25519 signer.
#[derive(Clone)]
pub struct LocalSigner {
    signing_key: SigningKey,
}

impl LocalSigner {
    /// Generate a signer with a random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The base58 wallet address for this signer.
    pub fn wallet_address(&self) -> WalletAddress {
        let key_bytes = self.signing_key.verifying_key().to_bytes();
        WalletAddress::new(bs58::encode(key_bytes).into_string())
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalSigner({})", self.wallet_address())
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn address(&self) -> Result<WalletAddress> {
        Ok(self.wallet_address())
    }

    async fn sign(&self, transaction: &Transaction) -> Result<SignedTransaction> {
        let message = transaction.message_bytes()?;
        let signature = self.signing_key.sign(&message);
        Ok(SignedTransaction {
            transaction: transaction.clone(),
            signature: TxSignature::new(bs58::encode(signature.to_bytes()).into_string()),
        })
    }
}
