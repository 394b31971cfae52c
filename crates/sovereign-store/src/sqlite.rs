//! SQLite implementation of the Store trait.
//!
//! The primary storage backend. Uses rusqlite with bundled SQLite, wrapped
//! in async via tokio::spawn_blocking.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use sovereign_core::{
    Anchor, Message, Profile, Role, Sha256Hash, Topic, TxSignature, WalletAddress,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking to
/// avoid blocking the async runtime; the connection mutex also serializes
/// read-modify-write mutators like `merge_topics`.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Internal(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("spawn_blocking failed: {}", e)))?
    }
}

fn millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Raw profile row. Stored text is validated separately so corruption
/// surfaces as `InvalidData`, not a silent default.
struct ProfileRow {
    wallet_address: String,
    xp: i64,
    level: i64,
    topics_json: String,
    hash_hex: Option<String>,
    last_anchored_at: Option<i64>,
}

fn read_profile_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        wallet_address: row.get("wallet_address")?,
        xp: row.get("xp")?,
        level: row.get("level")?,
        topics_json: row.get("topics_mastered")?,
        hash_hex: row.get("current_memory_hash")?,
        last_anchored_at: row.get("last_anchored_at")?,
    })
}

fn parse_profile(row: ProfileRow) -> Result<Profile> {
    let topics_mastered: BTreeSet<Topic> = serde_json::from_str(&row.topics_json)
        .map_err(|e| StoreError::InvalidData(format!("topics_mastered: {e}")))?;
    let current_memory_hash = row
        .hash_hex
        .map(|h| {
            Sha256Hash::from_hex(&h)
                .map_err(|e| StoreError::InvalidData(format!("current_memory_hash: {e}")))
        })
        .transpose()?;

    Ok(Profile {
        wallet_address: WalletAddress::new(row.wallet_address),
        xp: row.xp as u64,
        level: row.level as u32,
        topics_mastered,
        current_memory_hash,
        last_anchored_at: row.last_anchored_at.map(from_millis),
    })
}

struct AnchorRow {
    id: i64,
    wallet_address: String,
    hash_hex: String,
    tx_signature: String,
    message_count: i64,
    anchored_at: i64,
}

fn read_anchor_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnchorRow> {
    Ok(AnchorRow {
        id: row.get("id")?,
        wallet_address: row.get("wallet_address")?,
        hash_hex: row.get("memory_hash")?,
        tx_signature: row.get("tx_signature")?,
        message_count: row.get("message_count")?,
        anchored_at: row.get("anchored_at")?,
    })
}

fn parse_anchor(row: AnchorRow) -> Result<Anchor> {
    let memory_hash = Sha256Hash::from_hex(&row.hash_hex)
        .map_err(|e| StoreError::InvalidData(format!("memory_hash: {e}")))?;

    Ok(Anchor {
        id: row.id,
        wallet_address: WalletAddress::new(row.wallet_address),
        memory_hash,
        tx_signature: TxSignature::new(row.tx_signature),
        message_count: row.message_count as u32,
        anchored_at: from_millis(row.anchored_at),
    })
}

fn get_profile_sync(conn: &Connection, wallet: &WalletAddress) -> Result<Option<Profile>> {
    let row = conn
        .query_row(
            "SELECT wallet_address, xp, level, topics_mastered, current_memory_hash,
                    last_anchored_at
             FROM profiles WHERE wallet_address = ?1",
            params![wallet.as_str()],
            read_profile_row,
        )
        .optional()?;
    row.map(parse_profile).transpose()
}

fn require_profile_sync(conn: &Connection, wallet: &WalletAddress) -> Result<Profile> {
    get_profile_sync(conn, wallet)?
        .ok_or_else(|| StoreError::ProfileNotFound(wallet.as_str().to_string()))
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_profile(&self, wallet: &WalletAddress) -> Result<Profile> {
        let wallet = wallet.clone();
        self.call(move |conn| {
            if get_profile_sync(conn, &wallet)?.is_some() {
                return Err(StoreError::ProfileExists(wallet.as_str().to_string()));
            }
            conn.execute(
                "INSERT INTO profiles (wallet_address, xp, level, topics_mastered, created_at)
                 VALUES (?1, 0, 1, '[]', ?2)",
                params![wallet.as_str(), millis(Utc::now())],
            )?;
            require_profile_sync(conn, &wallet)
        })
        .await
    }

    async fn get_profile(&self, wallet: &WalletAddress) -> Result<Option<Profile>> {
        let wallet = wallet.clone();
        self.call(move |conn| get_profile_sync(conn, &wallet)).await
    }

    async fn award_xp(&self, wallet: &WalletAddress, delta: u64) -> Result<Profile> {
        let wallet = wallet.clone();
        self.call(move |conn| {
            // Single UPDATE: xp and level can never be observed inconsistent,
            // and concurrent awards cannot lose updates.
            let rows = conn.execute(
                "UPDATE profiles
                 SET xp = xp + ?1, level = (xp + ?1) / 1000 + 1
                 WHERE wallet_address = ?2",
                params![delta as i64, wallet.as_str()],
            )?;
            if rows == 0 {
                return Err(StoreError::ProfileNotFound(wallet.as_str().to_string()));
            }
            require_profile_sync(conn, &wallet)
        })
        .await
    }

    async fn update_memory_pointer(
        &self,
        wallet: &WalletAddress,
        hash: &Sha256Hash,
        anchored_at: DateTime<Utc>,
    ) -> Result<Profile> {
        let wallet = wallet.clone();
        let hash_hex = hash.to_hex();
        self.call(move |conn| {
            let rows = conn.execute(
                "UPDATE profiles SET current_memory_hash = ?1, last_anchored_at = ?2
                 WHERE wallet_address = ?3",
                params![hash_hex, millis(anchored_at), wallet.as_str()],
            )?;
            if rows == 0 {
                return Err(StoreError::ProfileNotFound(wallet.as_str().to_string()));
            }
            require_profile_sync(conn, &wallet)
        })
        .await
    }

    async fn merge_topics(
        &self,
        wallet: &WalletAddress,
        topics: &BTreeSet<Topic>,
    ) -> Result<Profile> {
        let wallet = wallet.clone();
        let new_topics = topics.clone();
        self.call(move |conn| {
            let tx = conn.transaction()?;

            let mut profile = require_profile_sync(&tx, &wallet)?;

            profile.topics_mastered.extend(new_topics);
            let topics_json = serde_json::to_string(&profile.topics_mastered)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

            tx.execute(
                "UPDATE profiles SET topics_mastered = ?1 WHERE wallet_address = ?2",
                params![topics_json, wallet.as_str()],
            )?;
            tx.commit()?;

            Ok(profile)
        })
        .await
    }

    async fn insert_message(&self, wallet: &WalletAddress, message: &Message) -> Result<()> {
        let wallet = wallet.clone();
        let message = message.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO chats (wallet_address, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    wallet.as_str(),
                    message.role.as_str(),
                    message.content,
                    millis(message.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_messages(&self, wallet: &WalletAddress, limit: u32) -> Result<Vec<Message>> {
        let wallet = wallet.clone();
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT role, content, created_at FROM chats
                 WHERE wallet_address = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;

            let mut messages: Vec<Message> = stmt
                .query_map(params![wallet.as_str(), limit as i64], |row| {
                    let role_str: String = row.get("role")?;
                    Ok((role_str, row.get::<_, String>("content")?, row.get::<_, i64>("created_at")?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?
                .into_iter()
                .map(|(role_str, content, created_at)| {
                    let role = Role::parse(&role_str)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                    Ok(Message::new(role, content, from_millis(created_at)))
                })
                .collect::<Result<Vec<_>>>()?;

            // Fetched newest-first for the limit; callers want oldest-first.
            messages.reverse();
            Ok(messages)
        })
        .await
    }

    async fn record_anchor(
        &self,
        wallet: &WalletAddress,
        hash: &Sha256Hash,
        signature: &TxSignature,
        message_count: u32,
        anchored_at: DateTime<Utc>,
    ) -> Result<Anchor> {
        let wallet = wallet.clone();
        let hash = *hash;
        let signature = signature.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO anchors (wallet_address, memory_hash, tx_signature, message_count,
                                      anchored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    wallet.as_str(),
                    hash.to_hex(),
                    signature.as_str(),
                    message_count as i64,
                    millis(anchored_at),
                ],
            )?;

            Ok(Anchor {
                id: conn.last_insert_rowid(),
                wallet_address: wallet,
                memory_hash: hash,
                tx_signature: signature,
                message_count,
                anchored_at,
            })
        })
        .await
    }

    async fn anchors(&self, wallet: &WalletAddress, limit: u32) -> Result<Vec<Anchor>> {
        let wallet = wallet.clone();
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, wallet_address, memory_hash, tx_signature, message_count, anchored_at
                 FROM anchors
                 WHERE wallet_address = ?1
                 ORDER BY anchored_at DESC, id DESC
                 LIMIT ?2",
            )?;

            let anchors = stmt
                .query_map(params![wallet.as_str(), limit as i64], read_anchor_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
                .into_iter()
                .map(parse_anchor)
                .collect();
            anchors
        })
        .await
    }

    async fn latest_anchor(&self, wallet: &WalletAddress) -> Result<Option<Anchor>> {
        Ok(self.anchors(wallet, 1).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> WalletAddress {
        WalletAddress::new("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU")
    }

    fn ts(ms: i64) -> DateTime<Utc> {
        from_millis(1_700_000_000_000 + ms)
    }

    #[tokio::test]
    async fn test_create_and_get_profile() {
        let store = SqliteStore::open_memory().unwrap();
        let created = store.create_profile(&wallet()).await.unwrap();
        assert_eq!(created.xp, 0);
        assert_eq!(created.level, 1);

        let fetched = store.get_profile(&wallet()).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_profile_twice_fails() {
        let store = SqliteStore::open_memory().unwrap();
        store.create_profile(&wallet()).await.unwrap();
        let err = store.create_profile(&wallet()).await.unwrap_err();
        assert!(matches!(err, StoreError::ProfileExists(_)));
    }

    #[tokio::test]
    async fn test_award_xp_recomputes_level() {
        let store = SqliteStore::open_memory().unwrap();
        store.create_profile(&wallet()).await.unwrap();

        let p = store.award_xp(&wallet(), 10).await.unwrap();
        assert_eq!(p.xp, 10);
        assert_eq!(p.level, 1);

        let p = store.award_xp(&wallet(), 995).await.unwrap();
        assert_eq!(p.xp, 1005);
        assert_eq!(p.level, 2);

        let p = store.award_xp(&wallet(), 9000).await.unwrap();
        assert_eq!(p.xp, 10_005);
        assert_eq!(p.level, 11);
    }

    #[tokio::test]
    async fn test_award_xp_requires_profile() {
        let store = SqliteStore::open_memory().unwrap();
        let err = store.award_xp(&wallet(), 10).await.unwrap_err();
        assert!(matches!(err, StoreError::ProfileNotFound(_)));
    }

    #[tokio::test]
    async fn test_merge_topics_idempotent() {
        let store = SqliteStore::open_memory().unwrap();
        store.create_profile(&wallet()).await.unwrap();

        let topics: BTreeSet<Topic> = ["Rust", "Calculus"].iter().map(|t| Topic::new(*t)).collect();
        let p1 = store.merge_topics(&wallet(), &topics).await.unwrap();
        assert_eq!(p1.topics_mastered.len(), 2);

        let p2 = store.merge_topics(&wallet(), &topics).await.unwrap();
        assert_eq!(p2.topics_mastered, p1.topics_mastered);
    }

    #[tokio::test]
    async fn test_update_memory_pointer() {
        let store = SqliteStore::open_memory().unwrap();
        store.create_profile(&wallet()).await.unwrap();

        let hash = Sha256Hash::hash(b"history");
        let at = ts(0);
        let p = store.update_memory_pointer(&wallet(), &hash, at).await.unwrap();
        assert_eq!(p.current_memory_hash, Some(hash));
        assert_eq!(p.last_anchored_at, Some(at));
    }

    #[tokio::test]
    async fn test_messages_ordered_and_limited() {
        let store = SqliteStore::open_memory().unwrap();
        for i in 0..5 {
            let msg = Message::new(Role::User, format!("m{i}"), ts(i * 1000));
            store.insert_message(&wallet(), &msg).await.unwrap();
        }

        let messages = store.recent_messages(&wallet(), 3).await.unwrap();
        assert_eq!(messages.len(), 3);
        // The newest three, oldest-first.
        assert_eq!(messages[0].content, "m2");
        assert_eq!(messages[2].content, "m4");
    }

    #[tokio::test]
    async fn test_anchors_append_only_ordering() {
        let store = SqliteStore::open_memory().unwrap();
        let h = Sha256Hash::hash(b"x");

        for i in 0..3 {
            store
                .record_anchor(&wallet(), &h, &TxSignature::new(format!("sig{i}")), i + 1, ts(i as i64 * 1000))
                .await
                .unwrap();
        }

        let anchors = store.anchors(&wallet(), 10).await.unwrap();
        assert_eq!(anchors.len(), 3);
        // Newest first.
        assert_eq!(anchors[0].tx_signature.as_str(), "sig2");

        let latest = store.latest_anchor(&wallet()).await.unwrap().unwrap();
        assert_eq!(latest.tx_signature.as_str(), "sig2");
    }

    #[tokio::test]
    async fn test_reads_filter_by_wallet() {
        let store = SqliteStore::open_memory().unwrap();
        let other = WalletAddress::new("otherwallet");

        store
            .insert_message(&wallet(), &Message::new(Role::User, "mine", ts(0)))
            .await
            .unwrap();
        store
            .insert_message(&other, &Message::new(Role::User, "theirs", ts(0)))
            .await
            .unwrap();

        let messages = store.recent_messages(&wallet(), 10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "mine");
    }

    #[tokio::test]
    async fn test_corrupt_topics_json_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store.create_profile(&wallet()).await.unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "UPDATE profiles SET topics_mastered = 'not json' WHERE wallet_address = ?1",
                params![wallet().as_str()],
            )
            .unwrap();
        }

        let err = store.get_profile(&wallet()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_corrupt_memory_hash_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store.create_profile(&wallet()).await.unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "UPDATE profiles SET current_memory_hash = 'zz-not-hex' WHERE wallet_address = ?1",
                params![wallet().as_str()],
            )
            .unwrap();
        }

        let err = store.get_profile(&wallet()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_corrupt_anchor_hash_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .record_anchor(&wallet(), &Sha256Hash::hash(b"x"), &TxSignature::new("sig"), 1, ts(0))
            .await
            .unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute("UPDATE anchors SET memory_hash = 'short'", [])
                .unwrap();
        }

        let err = store.anchors(&wallet(), 10).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));

        let err = store.latest_anchor(&wallet()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sovereign.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create_profile(&wallet()).await.unwrap();
            store.award_xp(&wallet(), 50).await.unwrap();
        }

        // Reopen and verify persistence.
        let store = SqliteStore::open(&path).unwrap();
        let p = store.get_profile(&wallet()).await.unwrap().unwrap();
        assert_eq!(p.xp, 50);
    }
}
