//! Runtime settings and the key-value configuration table.
//!
//! [`Settings`] is built once at startup (from CLI flags) and handed to the
//! components that need it. [`Config`] persists small pieces of state such
//! as the last chosen focus. It shares a database with
//! [`SqliteStore`](crate::store::sqlite::SqliteStore), so pass the same path
//! to both.

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::consts::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MODEL};

/// Config key for the remembered research focus.
pub const KEY_FOCUS: &str = "focus";
/// Config key for the remembered model.
pub const KEY_MODEL: &str = "model";

/// Options consulted by the fetcher, orchestrator, and store.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: String,
    pub fetch_timeout: Duration,
    /// Feed each step the previous step's output instead of the fetched page.
    pub chain_outputs: bool,
    /// Skip the full-text similarity index; search falls back to a scan.
    pub disable_vector_backend: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            chain_outputs: false,
            disable_vector_backend: true,
        }
    }
}

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

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("config connection poisoned"))
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a config key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }
}
