//! SQLite persistence for the subscriber registry.
//!
//! Registrations survive restarts so nobody is silently unsubscribed by a
//! redeploy. Armed alert state is deliberately not stored; after a restart
//! the worst case is one repeated alert per still-breaching position.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Persisted registration row.
#[derive(Debug, Clone)]
pub struct StoredSubscriber {
    pub chat_id: i64,
    pub wallet: String,
    pub threshold: Decimal,
    pub subscribed_at: DateTime<Utc>,
}

/// SQLite-backed subscriber store.
pub struct SubscriberStore {
    conn: Connection,
}

impl SubscriberStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        let store = Self { conn };
        store.init_schema()?;

        info!("Subscriber store initialized at {:?}", db_path.as_ref());
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Registrations; armed alert state is rebuilt at runtime
            CREATE TABLE IF NOT EXISTS subscribers (
                chat_id INTEGER PRIMARY KEY,
                wallet TEXT NOT NULL,
                threshold TEXT NOT NULL,
                subscribed_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    /// Insert or replace a registration.
    pub fn upsert(&self, subscriber: &StoredSubscriber) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO subscribers (chat_id, wallet, threshold, subscribed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(chat_id) DO UPDATE SET
                wallet = ?2,
                threshold = ?3,
                subscribed_at = ?4
            "#,
            params![
                subscriber.chat_id,
                subscriber.wallet,
                subscriber.threshold.to_string(),
                subscriber.subscribed_at.to_rfc3339(),
            ],
        )?;

        debug!(chat_id = subscriber.chat_id, "Subscriber persisted");
        Ok(())
    }

    /// Delete a registration. Returns whether a row existed.
    pub fn remove(&self, chat_id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM subscribers WHERE chat_id = ?1", params![chat_id])?;
        Ok(affected > 0)
    }

    /// All persisted registrations.
    pub fn load_all(&self) -> Result<Vec<StoredSubscriber>> {
        let mut stmt = self.conn.prepare(
            "SELECT chat_id, wallet, threshold, subscribed_at FROM subscribers ORDER BY chat_id",
        )?;

        let subscribers: Vec<StoredSubscriber> = stmt
            .query_map([], |row| {
                Ok(StoredSubscriber {
                    chat_id: row.get(0)?,
                    wallet: row.get(1)?,
                    threshold: Decimal::from_str(&row.get::<_, String>(2)?).unwrap_or_default(),
                    subscribed_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(3)?)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(subscribers)
    }

    /// Number of persisted registrations.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM subscribers", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn stored(chat_id: i64, wallet: &str, threshold: Decimal) -> StoredSubscriber {
        StoredSubscriber {
            chat_id,
            wallet: wallet.to_string(),
            threshold,
            subscribed_at: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_and_load_roundtrip() {
        let store = SubscriberStore::new(":memory:").unwrap();

        store.upsert(&stored(42, WALLET, dec!(5))).unwrap();
        store.upsert(&stored(7, WALLET, dec!(12.5))).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].chat_id, 7);
        assert_eq!(loaded[0].threshold, dec!(12.5));
        assert_eq!(loaded[1].chat_id, 42);
        assert_eq!(loaded[1].wallet, WALLET);
        assert_eq!(loaded[1].threshold, dec!(5));
    }

    #[test]
    fn test_upsert_replaces_existing_registration() {
        let store = SubscriberStore::new(":memory:").unwrap();
        let other = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

        store.upsert(&stored(42, WALLET, dec!(5))).unwrap();
        store.upsert(&stored(42, other, dec!(10))).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].wallet, other);
        assert_eq!(loaded[0].threshold, dec!(10));
    }

    #[test]
    fn test_remove() {
        let store = SubscriberStore::new(":memory:").unwrap();
        store.upsert(&stored(42, WALLET, dec!(5))).unwrap();

        assert!(store.remove(42).unwrap());
        assert_eq!(store.count().unwrap(), 0);
        assert!(!store.remove(42).unwrap());
    }

    #[test]
    fn test_count() {
        let store = SubscriberStore::new(":memory:").unwrap();
        assert_eq!(store.count().unwrap(), 0);

        store.upsert(&stored(1, WALLET, dec!(5))).unwrap();
        store.upsert(&stored(2, WALLET, dec!(5))).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }
}
