//! get / set / reset / list

use anyhow::{Context, Result};

use starless::store::{SettingsError, SettingsStore, StorageStatus};
use starless::SettingKey;

/// Print one setting
pub fn get_command(store: &SettingsStore, key: &str) -> Result<()> {
    let value = store.get_by_name(key)?;
    println!("{}", value);
    Ok(())
}

/// Change one setting
pub fn set_command(store: &SettingsStore, key: &str, value: &str) -> Result<()> {
    match store.set_by_name(key, value) {
        Ok(()) => {
            println!("{} = {}", key, value);
            Ok(())
        }
        Err(e @ SettingsError::Storage(_)) => {
            Err(e).with_context(|| format!("{} was not saved", key))
        }
        Err(e) => Err(e.into()),
    }
}

/// Reset one setting, or every setting when `key` is None
pub fn reset_command(store: &SettingsStore, key: Option<&str>) -> Result<()> {
    let keys = match key {
        Some(name) => vec![
            SettingKey::from_name(name)
                .ok_or_else(|| SettingsError::InvalidKey(name.to_string()))?,
        ],
        None => SettingKey::ALL.to_vec(),
    };

    for key in keys {
        store
            .reset(key)
            .with_context(|| format!("Failed to reset {}", key))?;
        println!("{} = {}", key, key.default_value());
    }
    Ok(())
}

/// Show every setting
pub fn list_command(store: &SettingsStore, json: bool) -> Result<()> {
    if json {
        let snapshot = store.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let width = SettingKey::ALL
        .iter()
        .map(|k| k.as_str().len())
        .max()
        .unwrap_or(0);
    for key in SettingKey::ALL {
        let value = store.get(key);
        let marker = if value == key.default_value() { "" } else { " *" };
        println!("  {:width$}  {:?}{}", key.as_str(), value.encode(), marker, width = width);
    }

    println!();
    println!("Storage: {}", store.backend_name());
    if let StorageStatus::Degraded { reason } = store.status() {
        println!("  not persisting: {}", reason);
    }
    for warning in store.load_warnings() {
        println!("  {}", warning);
    }
    Ok(())
}
