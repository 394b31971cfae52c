//! In-memory implementation of the Store trait.
//!
//! Mirrors the SQLite store's semantics exactly so tests can swap it in.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sovereign_core::{
    Anchor, Message, Profile, Sha256Hash, Topic, TxSignature, WalletAddress,
};

use crate::error::{Result, StoreError};
use crate::traits::Store;

#[derive(Default)]
struct Inner {
    profiles: HashMap<WalletAddress, Profile>,
    chats: HashMap<WalletAddress, Vec<Message>>,
    anchors: Vec<Anchor>,
    next_anchor_id: i64,
}

/// In-memory store, primarily for testing.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {}", e)))
    }
}

fn require_profile<'a>(inner: &'a mut Inner, wallet: &WalletAddress) -> Result<&'a mut Profile> {
    inner
        .profiles
        .get_mut(wallet)
        .ok_or_else(|| StoreError::ProfileNotFound(wallet.as_str().to_string()))
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_profile(&self, wallet: &WalletAddress) -> Result<Profile> {
        let mut inner = self.write()?;
        if inner.profiles.contains_key(wallet) {
            return Err(StoreError::ProfileExists(wallet.as_str().to_string()));
        }
        let profile = Profile::new(wallet.clone());
        inner.profiles.insert(wallet.clone(), profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, wallet: &WalletAddress) -> Result<Option<Profile>> {
        Ok(self.read()?.profiles.get(wallet).cloned())
    }

    async fn award_xp(&self, wallet: &WalletAddress, delta: u64) -> Result<Profile> {
        let mut inner = self.write()?;
        let profile = require_profile(&mut inner, wallet)?;
        profile.xp += delta;
        profile.level = (profile.xp / 1000) as u32 + 1;
        Ok(profile.clone())
    }

    async fn update_memory_pointer(
        &self,
        wallet: &WalletAddress,
        hash: &Sha256Hash,
        anchored_at: DateTime<Utc>,
    ) -> Result<Profile> {
        let mut inner = self.write()?;
        let profile = require_profile(&mut inner, wallet)?;
        profile.current_memory_hash = Some(*hash);
        profile.last_anchored_at = Some(anchored_at);
        Ok(profile.clone())
    }

    async fn merge_topics(
        &self,
        wallet: &WalletAddress,
        topics: &BTreeSet<Topic>,
    ) -> Result<Profile> {
        let mut inner = self.write()?;
        let profile = require_profile(&mut inner, wallet)?;
        profile.topics_mastered.extend(topics.iter().cloned());
        Ok(profile.clone())
    }

    async fn insert_message(&self, wallet: &WalletAddress, message: &Message) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .chats
            .entry(wallet.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent_messages(&self, wallet: &WalletAddress, limit: u32) -> Result<Vec<Message>> {
        let inner = self.read()?;
        let all = match inner.chats.get(wallet) {
            Some(messages) => messages,
            None => return Ok(Vec::new()),
        };

        // Insertion order is creation order, so the tail holds the newest.
        let mut sorted: Vec<Message> = all.clone();
        sorted.sort_by_key(|m| m.created_at);
        let start = sorted.len().saturating_sub(limit as usize);
        Ok(sorted[start..].to_vec())
    }

    async fn record_anchor(
        &self,
        wallet: &WalletAddress,
        hash: &Sha256Hash,
        signature: &TxSignature,
        message_count: u32,
        anchored_at: DateTime<Utc>,
    ) -> Result<Anchor> {
        let mut inner = self.write()?;
        inner.next_anchor_id += 1;
        let anchor = Anchor {
            id: inner.next_anchor_id,
            wallet_address: wallet.clone(),
            memory_hash: *hash,
            tx_signature: signature.clone(),
            message_count,
            anchored_at,
        };
        inner.anchors.push(anchor.clone());
        Ok(anchor)
    }

    async fn anchors(&self, wallet: &WalletAddress, limit: u32) -> Result<Vec<Anchor>> {
        let inner = self.read()?;
        let mut matched: Vec<Anchor> = inner
            .anchors
            .iter()
            .filter(|a| &a.wallet_address == wallet)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.anchored_at.cmp(&a.anchored_at).then(b.id.cmp(&a.id)));
        matched.truncate(limit as usize);
        Ok(matched)
    }

    async fn latest_anchor(&self, wallet: &WalletAddress) -> Result<Option<Anchor>> {
        Ok(self.anchors(wallet, 1).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sovereign_core::Role;

    fn wallet() -> WalletAddress {
        WalletAddress::new("testwallet")
    }

    fn ts(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[tokio::test]
    async fn test_profile_lifecycle() {
        let store = MemoryStore::new();
        assert!(store.get_profile(&wallet()).await.unwrap().is_none());

        store.create_profile(&wallet()).await.unwrap();
        let err = store.create_profile(&wallet()).await.unwrap_err();
        assert!(matches!(err, StoreError::ProfileExists(_)));

        let p = store.award_xp(&wallet(), 2500).await.unwrap();
        assert_eq!(p.xp, 2500);
        assert_eq!(p.level, 3);
    }

    #[tokio::test]
    async fn test_award_xp_requires_profile() {
        let store = MemoryStore::new();
        let err = store.award_xp(&wallet(), 10).await.unwrap_err();
        assert!(matches!(err, StoreError::ProfileNotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_messages_limit_and_order() {
        let store = MemoryStore::new();
        for i in 0..4 {
            store
                .insert_message(&wallet(), &Message::new(Role::User, format!("m{i}"), ts(i * 100)))
                .await
                .unwrap();
        }

        let messages = store.recent_messages(&wallet(), 2).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "m2");
        assert_eq!(messages[1].content, "m3");
    }

    #[tokio::test]
    async fn test_anchor_ids_monotonic() {
        let store = MemoryStore::new();
        let h = Sha256Hash::hash(b"h");
        let a1 = store
            .record_anchor(&wallet(), &h, &TxSignature::new("s1"), 1, ts(0))
            .await
            .unwrap();
        let a2 = store
            .record_anchor(&wallet(), &h, &TxSignature::new("s2"), 2, ts(1000))
            .await
            .unwrap();
        assert!(a2.id > a1.id);

        let latest = store.latest_anchor(&wallet()).await.unwrap().unwrap();
        assert_eq!(latest.tx_signature.as_str(), "s2");
    }

    #[tokio::test]
    async fn test_merge_topics_unions() {
        let store = MemoryStore::new();
        store.create_profile(&wallet()).await.unwrap();

        let first: BTreeSet<Topic> = [Topic::new("Rust")].into_iter().collect();
        let second: BTreeSet<Topic> = [Topic::new("Rust"), Topic::new("Algebra")]
            .into_iter()
            .collect();

        store.merge_topics(&wallet(), &first).await.unwrap();
        let p = store.merge_topics(&wallet(), &second).await.unwrap();
        assert_eq!(p.topics_mastered.len(), 2);
    }
}
