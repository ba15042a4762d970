//! Durable key-value storage behind the settings store
//!
//! Every setting lives under its own string key with a plain string value.
//! Backends only move strings around; encoding is the store's business.

pub(crate) mod atomic;
mod memory;
mod sqlite;
mod toml_file;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use toml_file::TomlFileBackend;

use std::path::PathBuf;

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to encode settings file: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A durable key-value medium for settings
pub trait SettingsBackend: Send {
    /// Short name for logs (e.g., "sqlite")
    fn name(&self) -> &str;

    /// Read the raw value stored under `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<B: SettingsBackend + ?Sized> SettingsBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// A backend standing in for a medium that could not be opened.
///
/// Every call fails with [`StorageError::Unavailable`], so a store opened on
/// it runs on defaults and reports itself degraded.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SettingsBackend for UnavailableBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}
