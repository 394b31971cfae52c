//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system: each migration transforms the schema
//! from version N to N+1.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: safe to call multiple times.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            info!(version, "applied schema migration");

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Per-wallet progress state. level is always recomputed alongside xp.
        CREATE TABLE profiles (
            wallet_address TEXT PRIMARY KEY,
            xp INTEGER NOT NULL DEFAULT 0,
            level INTEGER NOT NULL DEFAULT 1,
            topics_mastered TEXT NOT NULL DEFAULT '[]',  -- JSON array of topic names
            current_memory_hash TEXT,                    -- hex digest, nullable
            last_anchored_at INTEGER,                    -- Unix ms, nullable
            created_at INTEGER NOT NULL
        );

        -- Chat history. Rows are immutable once inserted.
        CREATE TABLE chats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wallet_address TEXT NOT NULL,
            role TEXT NOT NULL,                          -- 'user' | 'assistant'
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL                  -- Unix ms
        );

        -- Append-only anchor log. Never updated or deleted.
        CREATE TABLE anchors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wallet_address TEXT NOT NULL,
            memory_hash TEXT NOT NULL,                   -- hex digest
            tx_signature TEXT NOT NULL,                  -- base58 ledger signature
            message_count INTEGER NOT NULL,
            anchored_at INTEGER NOT NULL                 -- Unix ms
        );

        -- Indexes for the per-wallet timestamp-ordered reads
        CREATE INDEX idx_chats_wallet_created ON chats(wallet_address, created_at);
        CREATE INDEX idx_anchors_wallet_anchored ON anchors(wallet_address, anchored_at);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"profiles".to_string()));
        assert!(tables.contains(&"chats".to_string()));
        assert!(tables.contains(&"anchors".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);
    }
}
