// SQLite-backed local state store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::StateStore;

/// Durable key/value store for draft documents. Each key holds one JSON
/// document and the time it was last written.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open (or create) a SQLite database at `path` and ensure the state table
    /// exists. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_state (
                key      TEXT PRIMARY KEY,
                value    TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Poisoning is ignored: SQLite rolls back an interrupted statement.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist a JSON value under `key`, replacing any previous value.
    pub fn save_state(&self, key: &str, value: &Value) -> Result<()> {
        let conn = self.conn();
        let json_str = serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO draft_state (key, value, saved_at) VALUES (?1, ?2, ?3)",
            params![key, json_str, Utc::now().to_rfc3339()],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`.
    pub fn load_state(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row(
                "SELECT value FROM draft_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query draft state")?;

        match json_str {
            Some(s) => {
                let value = serde_json::from_str(&s).context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// When `key` was last saved, if ever.
    pub fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn();
        let stamp: Option<String> = conn
            .query_row(
                "SELECT saved_at FROM draft_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query saved_at")?;

        stamp
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|t| t.with_timezone(&Utc))
                    .with_context(|| format!("bad saved_at timestamp '{s}'"))
            })
            .transpose()
    }

    pub fn delete_state(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM draft_state WHERE key = ?1", params![key])
            .context("failed to delete state")?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for LocalStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        self.load_state(key)
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        self.save_state(key, value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_state(key)
    }
}
