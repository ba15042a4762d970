//! Shared test utilities

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use starless::storage::{MemoryBackend, SqliteBackend, SettingsBackend, TomlFileBackend};
use starless::SettingKey;
use starless::SettingValue;

/// Durable backends under test, each reopened from the same location
#[derive(Debug, Clone, Copy)]
pub enum BackendKind {
    Sqlite,
    Toml,
}

pub const DURABLE: [BackendKind; 2] = [BackendKind::Sqlite, BackendKind::Toml];

impl BackendKind {
    pub fn path(&self, dir: &Path) -> PathBuf {
        match self {
            BackendKind::Sqlite => dir.join("settings.db"),
            BackendKind::Toml => dir.join("settings.toml"),
        }
    }

    /// Open a fresh handle on the storage, as a restarted process would
    pub fn open(&self, dir: &Path) -> Box<dyn SettingsBackend> {
        let path = self.path(dir);
        match self {
            BackendKind::Sqlite => {
                Box::new(SqliteBackend::open(&path).expect("Failed to open sqlite backend"))
            }
            BackendKind::Toml => Box::new(TomlFileBackend::new(path)),
        }
    }
}

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn empty_memory() -> MemoryBackend {
    MemoryBackend::new()
}

/// A non-default value of the right kind for every key
pub fn sample_value(key: SettingKey) -> SettingValue {
    match key {
        SettingKey::ToolPath => SettingValue::from("/opt/starnet/starnet++"),
        SettingKey::OutputFilename => SettingValue::from("myresult"),
        SettingKey::TempFileName => SettingValue::from("scratch"),
        SettingKey::AutoScroll => SettingValue::Flag(true),
    }
}
