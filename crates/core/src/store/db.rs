//! # Catalog Database
//!
//! Single SQLite database for all persisted state, at `.zerocost/zerocost.db`.
//! Collections are stored as independently keyed JSON blobs, one row per
//! collection, so a corrupt blob can be recovered per key.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Blob key for the tool collection
pub const KEY_TOOLS: &str = "tools";
/// Blob key for the starter pack collection
pub const KEY_PACKS: &str = "packs";

/// Database manager for all ZeroCost state
pub struct CatalogDb {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogDb {
    /// Open or create the database at the default location.
    ///
    /// `ZEROCOST_DB_PATH` overrides the location (useful for testing).
    pub fn open() -> Result<Self> {
        if let Ok(path) = std::env::var("ZEROCOST_DB_PATH") {
            return Self::open_at(path);
        }
        Self::open_at(".zerocost/zerocost.db")
    }

    /// Open database at a specific path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(path.as_ref()).context("Failed to open zerocost database")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Get a shared connection for use by other modules
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Run schema migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            conn.execute(
                r#"
                CREATE TABLE IF NOT EXISTS catalog_blobs (
                    key TEXT PRIMARY KEY,
                    data TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )
                "#,
                [],
            )?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [1],
            )?;
        }

        tracing::info!("CatalogDb ready, schema version {}", SCHEMA_VERSION);

        Ok(())
    }

    /// Read a blob by key; `None` when never written
    pub fn get_blob(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.query_row(
            "SELECT data FROM catalog_blobs WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to read blob '{}'", key))
    }

    /// Upsert a blob
    pub fn set_blob(&self, key: &str, data: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO catalog_blobs (key, data, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                data = ?2,
                updated_at = datetime('now')
            "#,
            params![key, data],
        )
        .with_context(|| format!("Failed to write blob '{}'", key))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_creates_tables() {
        let path = ".zerocost/test_db_open.db";
        let _ = fs::remove_file(path);

        let db = CatalogDb::open_at(path).unwrap();
        let conn = db.connection();
        let conn = conn.lock().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"catalog_blobs".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));

        drop(conn);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_schema_version_tracking() {
        let path = ".zerocost/test_db_version.db";
        let _ = fs::remove_file(path);

        let db1 = CatalogDb::open_at(path).unwrap();
        drop(db1);

        // Second open must not fail or re-run migrations destructively
        let db2 = CatalogDb::open_at(path).unwrap();
        let conn = db2.connection();
        let conn = conn.lock().unwrap();

        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        drop(conn);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_blob_round_trip() {
        let path = ".zerocost/test_db_blob.db";
        let _ = fs::remove_file(path);

        let db = CatalogDb::open_at(path).unwrap();
        assert!(db.get_blob(KEY_TOOLS).unwrap().is_none());

        db.set_blob(KEY_TOOLS, "[1,2,3]").unwrap();
        assert_eq!(db.get_blob(KEY_TOOLS).unwrap().unwrap(), "[1,2,3]");

        // Overwrite
        db.set_blob(KEY_TOOLS, "[]").unwrap();
        assert_eq!(db.get_blob(KEY_TOOLS).unwrap().unwrap(), "[]");

        let _ = fs::remove_file(path);
    }
}
