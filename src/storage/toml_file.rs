//! Flat TOML file storage
//!
//! The file is a single table of `key = "value"` strings. Reads go to disk
//! every time so another process' writes are picked up; writes take an
//! exclusive lock, then replace the file atomically.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{atomic, SettingsBackend, StorageError};

pub struct TomlFileBackend {
    path: PathBuf,
}

impl TomlFileBackend {
    /// Default file location (~/.starless/settings.toml)
    pub fn default_path() -> PathBuf {
        crate::config::Config::global_config_dir().join("settings.toml")
    }

    /// Use the file at `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let table: toml::Table = toml::from_str(&content).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })?;

        // Non-string entries come from hand edits (autoScroll = true); keep them
        // as their TOML text so the store can still decode them.
        Ok(table
            .into_iter()
            .map(|(k, v)| match v {
                toml::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let guard = atomic::lock(&self.path).map_err(|e| StorageError::io(&self.path, e))?;

        let mut entries = self.load()?;
        mutate(&mut entries);
        let content = toml::to_string_pretty(&entries)?;

        atomic::replace(&guard, &self.path, &content).map_err(|e| StorageError::io(&self.path, e))
    }
}

impl SettingsBackend for TomlFileBackend {
    fn name(&self) -> &str {
        "toml"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let backend = TomlFileBackend::new(dir.path().join("settings.toml"));
        assert_eq!(backend.read("toolPath").unwrap(), None);
    }

    #[test]
    fn test_write_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        let mut backend = TomlFileBackend::new(&path);

        backend.write("toolPath", "C:\\starnet\\starnet++.exe").unwrap();
        backend.write("autoScroll", "true").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("autoScroll = \"true\""));
        assert_eq!(
            backend.read("toolPath").unwrap().as_deref(),
            Some("C:\\starnet\\starnet++.exe")
        );
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_hand_edited_bool_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "autoScroll = true\n").unwrap();

        let backend = TomlFileBackend::new(&path);
        assert_eq!(backend.read("autoScroll").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_garbage_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let backend = TomlFileBackend::new(&path);
        assert!(matches!(
            backend.read("toolPath"),
            Err(StorageError::Parse { .. })
        ));
    }
}
