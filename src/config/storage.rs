//! Storage backend selection

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::{
    MemoryBackend, SettingsBackend, SqliteBackend, StorageError, TomlFileBackend,
    UnavailableBackend,
};
use crate::store::SettingsStore;

/// Which durable medium holds the user's settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Toml,
    /// Nothing survives the process; useful for dry runs
    Memory,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Sqlite => write!(f, "sqlite"),
            StorageKind::Toml => write!(f, "toml"),
            StorageKind::Memory => write!(f, "memory"),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend: "sqlite" (default), "toml" or "memory"
    #[serde(default)]
    pub backend: StorageKind,

    /// Location of the settings file or database
    /// Empty: ~/.starless/settings.db (sqlite) or ~/.starless/settings.toml (toml)
    #[serde(default)]
    pub path: String,
}

impl StorageConfig {
    /// Resolved location, None for the memory backend
    pub fn resolved_path(&self) -> Option<PathBuf> {
        let explicit = (!self.path.trim().is_empty()).then(|| PathBuf::from(self.path.trim()));
        match self.backend {
            StorageKind::Sqlite => Some(explicit.unwrap_or_else(SqliteBackend::default_path)),
            StorageKind::Toml => Some(explicit.unwrap_or_else(TomlFileBackend::default_path)),
            StorageKind::Memory => None,
        }
    }

    pub fn open_backend(&self) -> Result<Box<dyn SettingsBackend>, StorageError> {
        let backend: Box<dyn SettingsBackend> = match (self.backend, self.resolved_path()) {
            (StorageKind::Sqlite, Some(path)) => Box::new(SqliteBackend::open(&path)?),
            (StorageKind::Toml, Some(path)) => Box::new(TomlFileBackend::new(path)),
            _ => Box::new(MemoryBackend::new()),
        };
        Ok(backend)
    }

    /// Open the settings store on the configured backend.
    ///
    /// A backend that cannot be opened yields a degraded store running on
    /// defaults instead of an error.
    pub fn open_store(&self) -> SettingsStore {
        match self.open_backend() {
            Ok(backend) => SettingsStore::open(backend),
            Err(e) => {
                tracing::warn!("Could not open {} settings storage: {}", self.backend, e);
                SettingsStore::open(UnavailableBackend::new(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let config = StorageConfig {
            backend: StorageKind::Toml,
            path: " /tmp/custom.toml ".to_string(),
        };
        assert_eq!(config.resolved_path(), Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[test]
    fn test_memory_has_no_path() {
        let config = StorageConfig {
            backend: StorageKind::Memory,
            path: String::new(),
        };
        assert_eq!(config.resolved_path(), None);
        assert_eq!(config.open_store().backend_name(), "memory");
    }

    #[test]
    fn test_unopenable_sqlite_degrades() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let config = StorageConfig {
            backend: StorageKind::Sqlite,
            path: blocker.join("settings.db").display().to_string(),
        };
        let store = config.open_store();
        assert!(!store.status().is_durable());
        assert_eq!(store.output_filename(), "starless");
    }
}
