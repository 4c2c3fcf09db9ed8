//! Key-value configuration storage backed by SQLite.
//!
//! Shares a database with [`SqliteTokenStore`](crate::auth::storage::SqliteTokenStore)
//! — pass the same path to both.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::auth::oauth::ClientCredentials;

/// Config key holding the OAuth client ID.
pub const CLIENT_ID_KEY: &str = "client_id";
/// Config key holding the OAuth client secret.
pub const CLIENT_SECRET_KEY: &str = "client_secret";

/// Keys accepted by `config set`.
pub const KNOWN_KEYS: &[&str] = &[CLIENT_ID_KEY, CLIENT_SECRET_KEY];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert). Only [`KNOWN_KEYS`] are accepted.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if !KNOWN_KEYS.contains(&key) {
            bail!("unknown config key: {key} (expected one of {})", KNOWN_KEYS.join(", "));
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a config key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Resolve client credentials: explicit values win over stored ones.
    ///
    /// Missing values come back empty; [`ClientCredentials::validate`]
    /// reports them when a grant is attempted.
    pub fn credentials(
        &self,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<ClientCredentials> {
        let client_id = match client_id {
            Some(id) => id,
            None => self.get(CLIENT_ID_KEY)?.unwrap_or_default(),
        };
        let client_secret = match client_secret {
            Some(secret) => secret,
            None => self.get(CLIENT_SECRET_KEY)?.unwrap_or_default(),
        };
        Ok(ClientCredentials::new(client_id, client_secret))
    }
}
