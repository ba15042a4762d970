//! SQLite storage for settings
//!
//! Manages `~/.starless/settings.db` with a single `settings` table keyed by
//! setting name.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{SettingsBackend, StorageError};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

pub struct SqliteBackend {
    conn: Connection,
    path: PathBuf,
}

impl SqliteBackend {
    /// Default database location (~/.starless/settings.db)
    pub fn default_path() -> PathBuf {
        crate::config::Config::global_config_dir().join("settings.db")
    }

    /// Open or create the database at the default location
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(&Self::default_path())
    }

    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL so a CLI reader does not block a writer in another process
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA_SQL)?;

        tracing::debug!("Opened settings db at {}", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current schema version
    pub fn schema_version(&self) -> Result<i32, StorageError> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )?;
        Ok(version)
    }
}

impl SettingsBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |r| r.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read_remove() {
        let dir = TempDir::new().unwrap();
        let mut db = SqliteBackend::open(&dir.path().join("settings.db")).unwrap();

        assert_eq!(db.read("toolPath").unwrap(), None);
        db.write("toolPath", "/opt/starnet/starnet++").unwrap();
        db.write("toolPath", "/usr/local/bin/starnet++").unwrap();
        assert_eq!(
            db.read("toolPath").unwrap().as_deref(),
            Some("/usr/local/bin/starnet++")
        );

        db.remove("toolPath").unwrap();
        db.remove("toolPath").unwrap();
        assert_eq!(db.read("toolPath").unwrap(), None);
    }

    #[test]
    fn test_creates_parent_dirs_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/settings.db");
        let db = SqliteBackend::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.db");
        {
            let mut db = SqliteBackend::open(&path).unwrap();
            db.write("autoScroll", "true").unwrap();
        }
        let db = SqliteBackend::open(&path).unwrap();
        assert_eq!(db.read("autoScroll").unwrap().as_deref(), Some("true"));
    }
}
