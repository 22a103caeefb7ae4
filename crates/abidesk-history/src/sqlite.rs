//! SQLite-backed `HistoryStore` implementation.
//!
//! Persists deployment records as JSON blobs in a local SQLite database.
//! Suitable for long-running processes that need durable history without a
//! database server.
//!
//! ## Schema
//! ```sql
//! CREATE TABLE ad_deployments (
//!     id          TEXT PRIMARY KEY,
//!     address     TEXT NOT NULL,
//!     network     TEXT NOT NULL,
//!     deployed_at TEXT NOT NULL,
//!     entry_json  TEXT NOT NULL
//! );
//! ```
//! Insertion order is the rowid order, which `all()` relies on.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::{params, Connection};
use tracing::debug;

use abidesk_core::{
    error::HistoryError,
    history::{DeploymentRecord, HistoryStore},
};

/// SQLite-backed deployment history.
///
/// Thread-safe via an internal `Arc<Mutex<Connection>>`; WAL mode is enabled
/// for concurrent read performance.
#[derive(Clone)]
pub struct SqliteHistory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistory {
    /// Open (or create) a history database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let conn = Connection::open(path.as_ref()).map_err(sqlite_err)?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(sqlite_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ad_deployments (
                id          TEXT PRIMARY KEY,
                address     TEXT NOT NULL,
                network     TEXT NOT NULL,
                deployed_at TEXT NOT NULL,
                entry_json  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS ad_deployments_addr
                ON ad_deployments (address);",
        )
        .map_err(sqlite_err)?;

        debug!(path = %path.as_ref().display(), "history database opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory history (useful for tests).
    pub fn in_memory() -> Result<Self, HistoryError> {
        Self::open(":memory:")
    }
}

impl HistoryStore for SqliteHistory {
    fn save(&self, entry: DeploymentRecord) -> Result<(), HistoryError> {
        let json = serde_json::to_string(&entry)?;
        let conn = self.conn.lock().unwrap();

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM ad_deployments WHERE id = ?1",
                params![&entry.id],
                |_| Ok(true),
            )
            .unwrap_or(false);
        if exists {
            return Err(HistoryError::AlreadyExists { id: entry.id });
        }

        conn.execute(
            "INSERT INTO ad_deployments (id, address, network, deployed_at, entry_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &entry.id,
                &entry.address,
                &entry.network,
                &entry.deployed_at.to_rfc3339(),
                &json,
            ],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<DeploymentRecord>, HistoryError> {
        let conn = self.conn.lock().unwrap();
        let json: Option<String> = conn
            .query_row(
                "SELECT entry_json FROM ad_deployments WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(sqlite_err(other)),
            })?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn all(&self) -> Result<Vec<DeploymentRecord>, HistoryError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT entry_json FROM ad_deployments ORDER BY rowid")
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(sqlite_err)?;

        let mut records = Vec::new();
        for row in rows {
            let json = row.map_err(sqlite_err)?;
            records.push(serde_json::from_str(&json)?);
        }
        Ok(records)
    }
}

fn sqlite_err(e: rusqlite::Error) -> HistoryError {
    HistoryError::Database(e.to_string())
}
