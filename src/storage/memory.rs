//! In-process storage
//!
//! Clones share the same map, so a second store opened on a clone sees what
//! the first one wrote. Tests use this to simulate a restart and, with
//! [`MemoryBackend::set_available`], an unreachable medium.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{SettingsBackend, StorageError};

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-filled with raw entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let backend = Self::new();
        {
            let mut map = backend.entries.lock().unwrap_or_else(|e| e.into_inner());
            for (k, v) in entries {
                map.insert(k.into(), v.into());
            }
        }
        backend
    }

    /// Toggle whether reads and writes succeed
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Raw copy of everything stored
    pub fn entries(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory backend switched off".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        let map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let mut a = MemoryBackend::new();
        let b = a.clone();
        a.write("outputFilename", "myresult").unwrap();
        assert_eq!(b.read("outputFilename").unwrap().as_deref(), Some("myresult"));
    }

    #[test]
    fn test_unavailable_fails_every_call() {
        let mut backend = MemoryBackend::new();
        backend.set_available(false);
        assert!(matches!(
            backend.read("toolPath"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(backend.write("toolPath", "x").is_err());
        assert!(backend.remove("toolPath").is_err());

        backend.set_available(true);
        assert!(backend.write("toolPath", "x").is_ok());
    }
}
