//! The settings store
//!
//! A cloneable handle around the user's settings with write-through to a
//! [`SettingsBackend`]. All clones share one state; nothing else should keep
//! its own copy of a setting.
//!
//! # Usage
//!
//! ```ignore
//! let store = SettingsStore::open(SqliteBackend::open_default()?);
//!
//! store.subscribe(SettingKey::AutoScroll, |change| {
//!     println!("auto scroll is now {}", change.new);
//! });
//!
//! store.set(SettingKey::OutputFilename, "myresult")?;
//! assert_eq!(store.output_filename(), "myresult");
//! ```
//!
//! # Storage failures
//!
//! A store whose backend cannot be read opens with defaults and reports
//! [`StorageStatus::Degraded`]. A failed write still updates memory and
//! notifies observers, then returns [`SettingsError::Storage`]. [`flush`]
//! rewrites every value once the medium is back.
//!
//! # Observers
//!
//! Callbacks run synchronously on the writing thread, after the store lock is
//! released, so they may call back into the store. Two threads writing the
//! same key can deliver their changes in either order; use
//! [`SettingChange::revision`] to discard stale ones.
//!
//! [`flush`]: SettingsStore::flush

mod error;
mod observer;

pub use error::SettingsError;
pub use observer::{SettingChange, SubscriptionId};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{SettingKey, SettingValue, Settings};
use crate::storage::{SettingsBackend, StorageError};

use observer::Observers;

/// Whether writes currently reach durable storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageStatus {
    Durable,
    /// Values may only live in memory until the next successful `flush`
    Degraded { reason: String },
}

impl StorageStatus {
    pub fn is_durable(&self) -> bool {
        matches!(self, StorageStatus::Durable)
    }
}

/// A persisted value that could not be decoded and was replaced by the default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub key: SettingKey,
    pub raw: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ignored stored {} {:?}, expected a {}",
            self.key,
            self.raw,
            self.key.kind()
        )
    }
}

struct State {
    values: Settings,
    backend: Box<dyn SettingsBackend>,
    status: StorageStatus,
    warnings: Vec<LoadWarning>,
    revision: u64,
}

struct Inner {
    state: Mutex<State>,
    observers: Mutex<Observers>,
}

/// Shared, observable settings service
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SettingsStore")
            .field("backend", &state.backend.name())
            .field("values", &state.values)
            .field("status", &state.status)
            .finish()
    }
}

impl SettingsStore {
    /// Open a store on `backend`, falling back to defaults if it cannot be read.
    pub fn open<B>(backend: B) -> Self
    where
        B: SettingsBackend + 'static,
    {
        let backend: Box<dyn SettingsBackend> = Box::new(backend);
        let (values, warnings, status) = match load_all(backend.as_ref()) {
            Ok((values, warnings)) => (values, warnings, StorageStatus::Durable),
            Err(e) => {
                tracing::warn!(
                    "Settings storage '{}' unavailable, using defaults: {}",
                    backend.name(),
                    e
                );
                (
                    Settings::default(),
                    Vec::new(),
                    StorageStatus::Degraded {
                        reason: e.to_string(),
                    },
                )
            }
        };
        Self::from_parts(values, backend, status, warnings)
    }

    /// Open a store on `backend`, failing if it cannot be read.
    pub fn try_open<B>(backend: B) -> Result<Self, SettingsError>
    where
        B: SettingsBackend + 'static,
    {
        let backend: Box<dyn SettingsBackend> = Box::new(backend);
        let (values, warnings) = load_all(backend.as_ref())?;
        Ok(Self::from_parts(
            values,
            backend,
            StorageStatus::Durable,
            warnings,
        ))
    }

    fn from_parts(
        values: Settings,
        backend: Box<dyn SettingsBackend>,
        status: StorageStatus,
        warnings: Vec<LoadWarning>,
    ) -> Self {
        for warning in &warnings {
            tracing::warn!("Settings: {}", warning);
        }
        tracing::debug!("Settings loaded from {}: {:?}", backend.name(), values);

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    values,
                    backend,
                    status,
                    warnings,
                    revision: 0,
                }),
                observers: Mutex::new(Observers::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn observers(&self) -> MutexGuard<'_, Observers> {
        self.inner.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current value for `key` (the default if nothing was ever stored)
    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.state().values.value(key)
    }

    /// Like [`get`](Self::get) but resolves the key from its name
    pub fn get_by_name(&self, name: &str) -> Result<SettingValue, SettingsError> {
        Ok(self.get(parse_key(name)?))
    }

    /// Copy of every current value
    pub fn snapshot(&self) -> Settings {
        self.state().values.clone()
    }

    pub fn tool_path(&self) -> String {
        self.state().values.tool_path.clone()
    }

    pub fn output_filename(&self) -> String {
        self.state().values.output_filename.clone()
    }

    pub fn temp_file_name(&self) -> String {
        self.state().values.temp_file_name.clone()
    }

    pub fn auto_scroll(&self) -> bool {
        self.state().values.auto_scroll
    }

    /// Write `value` to memory and through to storage, then notify observers.
    ///
    /// On [`SettingsError::Storage`] the new value is already live in memory.
    pub fn set(
        &self,
        key: SettingKey,
        value: impl Into<SettingValue>,
    ) -> Result<(), SettingsError> {
        let value = value.into();
        if value.kind() != key.kind() {
            return Err(SettingsError::TypeMismatch {
                key,
                expected: key.kind(),
            });
        }

        let (change, result) = {
            let mut state = self.state();
            let old = state.values.value(key);
            state.values.apply(key, &value);
            state.revision += 1;

            let result = write_through(state.backend.as_mut(), key, &value);
            if let Err(e) = &result {
                tracing::warn!("Failed to persist setting {}: {}", key, e);
                state.status = StorageStatus::Degraded {
                    reason: e.to_string(),
                };
            } else {
                tracing::debug!("Setting {} = {:?}", key, value.encode());
            }

            let change = SettingChange {
                key,
                old,
                new: value,
                persisted: result.is_ok(),
                revision: state.revision,
            };
            (change, result)
        };

        self.notify(&change);
        result.map_err(SettingsError::from)
    }

    /// Parse `raw` with the key's encoding and [`set`](Self::set) it
    pub fn set_by_name(&self, name: &str, raw: &str) -> Result<(), SettingsError> {
        let key = parse_key(name)?;
        let value =
            SettingValue::decode(key.kind(), raw).ok_or_else(|| SettingsError::InvalidValue {
                key,
                value: raw.to_string(),
                expected: key.kind(),
            })?;
        self.set(key, value)
    }

    /// Put `key` back to its default value
    pub fn reset(&self, key: SettingKey) -> Result<(), SettingsError> {
        self.set(key, key.default_value())
    }

    /// Rewrite every current value to storage.
    ///
    /// Marks the store durable again when all writes succeed.
    pub fn flush(&self) -> Result<(), SettingsError> {
        let mut state = self.state();
        let values = state.values.clone();
        for key in SettingKey::ALL {
            if let Err(e) = write_through(state.backend.as_mut(), key, &values.value(key)) {
                state.status = StorageStatus::Degraded {
                    reason: e.to_string(),
                };
                return Err(e.into());
            }
        }
        if !state.status.is_durable() {
            tracing::info!("Settings storage '{}' recovered", state.backend.name());
        }
        state.status = StorageStatus::Durable;
        Ok(())
    }

    /// Call `callback` synchronously after every write to `key`
    pub fn subscribe<F>(&self, key: SettingKey, callback: F) -> SubscriptionId
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.observers().add(Some(key), Arc::new(callback))
    }

    /// Call `callback` synchronously after every write to any key
    pub fn subscribe_all<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.observers().add(None, Arc::new(callback))
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers().remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers().len()
    }

    pub fn status(&self) -> StorageStatus {
        self.state().status.clone()
    }

    /// Values found in storage that could not be decoded during open
    pub fn load_warnings(&self) -> Vec<LoadWarning> {
        self.state().warnings.clone()
    }

    pub fn backend_name(&self) -> String {
        self.state().backend.name().to_string()
    }

    fn notify(&self, change: &SettingChange) {
        // Collected first so callbacks may subscribe or call back into the store
        let callbacks = self.observers().matching(change.key);
        for callback in callbacks {
            callback(change);
        }
    }
}

fn parse_key(name: &str) -> Result<SettingKey, SettingsError> {
    SettingKey::from_name(name).ok_or_else(|| SettingsError::InvalidKey(name.to_string()))
}

fn load_all(
    backend: &dyn SettingsBackend,
) -> Result<(Settings, Vec<LoadWarning>), StorageError> {
    let mut values = Settings::default();
    let mut warnings = Vec::new();

    for key in SettingKey::ALL {
        let raw = match backend.read(key.as_str())? {
            Some(raw) => Some(raw),
            None => match key.legacy_name() {
                Some(legacy) => backend.read(legacy)?,
                None => None,
            },
        };
        let Some(raw) = raw else {
            continue;
        };

        match SettingValue::decode(key.kind(), &raw) {
            Some(value) => {
                values.apply(key, &value);
            }
            None => warnings.push(LoadWarning { key, raw }),
        }
    }

    Ok((values, warnings))
}

fn write_through(
    backend: &mut dyn SettingsBackend,
    key: SettingKey,
    value: &SettingValue,
) -> Result<(), StorageError> {
    backend.write(key.as_str(), &value.encode())?;
    if let Some(legacy) = key.legacy_name() {
        // Stale legacy entries would shadow nothing but clutter the medium
        if let Err(e) = backend.remove(legacy) {
            tracing::debug!("Could not drop legacy key {}: {}", legacy, e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults_before_any_set() {
        let store = SettingsStore::open(MemoryBackend::new());
        assert_eq!(store.tool_path(), "");
        assert_eq!(store.output_filename(), "starless");
        assert_eq!(store.temp_file_name(), "starnetTempInput");
        assert!(!store.auto_scroll());
        assert!(store.status().is_durable());
    }

    #[test]
    fn test_legacy_keys_are_read_and_migrated() {
        let backend = MemoryBackend::with_entries([
            ("starnetPath", "/opt/starnet/starnet++"),
            ("tempFile", "scratch"),
        ]);
        let store = SettingsStore::open(backend.clone());
        assert_eq!(store.tool_path(), "/opt/starnet/starnet++");
        assert_eq!(store.temp_file_name(), "scratch");

        store.set(SettingKey::ToolPath, "/usr/bin/starnet++").unwrap();
        let raw = backend.entries();
        assert_eq!(raw.get("toolPath").map(String::as_str), Some("/usr/bin/starnet++"));
        assert!(!raw.contains_key("starnetPath"));
        assert!(raw.contains_key("tempFile"));
    }

    #[test]
    fn test_canonical_key_wins_over_legacy() {
        let backend = MemoryBackend::with_entries([
            ("starnetPath", "/old"),
            ("toolPath", "/new"),
        ]);
        let store = SettingsStore::open(backend);
        assert_eq!(store.tool_path(), "/new");
    }

    #[test]
    fn test_undecodable_value_falls_back_with_warning() {
        let backend = MemoryBackend::with_entries([("autoScroll", "maybe")]);
        let store = SettingsStore::open(backend);
        assert!(!store.auto_scroll());
        assert_eq!(
            store.load_warnings(),
            vec![LoadWarning {
                key: SettingKey::AutoScroll,
                raw: "maybe".to_string()
            }]
        );
    }

    #[test]
    fn test_type_mismatch_changes_nothing() {
        let store = SettingsStore::open(MemoryBackend::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe_all(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let err = store.set(SettingKey::AutoScroll, "yes").unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));
        assert!(!store.auto_scroll());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observer_may_read_store() {
        let store = SettingsStore::open(MemoryBackend::new());
        let reader = store.clone();
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(SettingKey::OutputFilename, move |_| {
            *sink.lock().unwrap() = reader.output_filename();
        });

        store.set(SettingKey::OutputFilename, "m42").unwrap();
        assert_eq!(*seen.lock().unwrap(), "m42");
    }

    #[test]
    fn test_flush_recovers_status() {
        let backend = MemoryBackend::new();
        let store = SettingsStore::open(backend.clone());

        backend.set_available(false);
        assert!(store.set(SettingKey::OutputFilename, "offline").is_err());
        assert!(!store.status().is_durable());

        backend.set_available(true);
        store.flush().unwrap();
        assert!(store.status().is_durable());
        assert_eq!(
            backend.entries().get("outputFilename").map(String::as_str),
            Some("offline")
        );
    }
}
