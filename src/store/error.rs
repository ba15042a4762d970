use crate::domain::{SettingKey, ValueKind};
use crate::storage::StorageError;

/// Errors returned by the settings store
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    InvalidKey(String),

    #[error("Invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: SettingKey,
        value: String,
        expected: ValueKind,
    },

    #[error("Setting {key} holds a {expected}")]
    TypeMismatch { key: SettingKey, expected: ValueKind },

    /// The value is live in memory but could not be persisted
    #[error("Settings storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl SettingsError {
    /// Whether the in-memory state was still updated
    pub fn is_storage(&self) -> bool {
        matches!(self, SettingsError::Storage(_))
    }
}
