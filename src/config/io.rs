//! Configuration file I/O operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Config;
use crate::storage::atomic;

/// Commented configuration written on first start
pub const DEFAULT_CONFIG: &str = r#"# Starless configuration
# =======================
#
# User settings (tool path, output name, ...) are kept in the settings
# storage below and changed with `starless set <key> <value>`.

# ============================================================================
# STORAGE - Where user settings are persisted
# ============================================================================
#
#   backend - "sqlite" (default), "toml" or "memory" (nothing is kept)
#   path    - File location; empty uses ~/.starless/settings.db or settings.toml

[storage]
backend = "sqlite"
path = ""

# ============================================================================
# RUNNER - How starnet++ is invoked
# ============================================================================
#
#   input_extension   - Extension of the staged input and the output (default: tiff)
#   stride            - Tile stride passed to starnet++ (default: 256)
#   stdin_nudge_every - Write nudge_message to stdin after N output lines (0 = never)
#   nudge_message     - Text written on a nudge (default: newline)

[runner]
input_extension = "tiff"
stride = 256
stdin_nudge_every = 4
nudge_message = "\n"

# ============================================================================
# LOGGING
# ============================================================================
#
#   level - Default filter when RUST_LOG is unset (e.g., "info", "starless=debug")

[logging]
level = "info"
"#;

impl Config {
    /// Get the global config directory path (~/.starless/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".starless")
    }

    /// Get the global config file path (~/.starless/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a file with atomic write and file locking.
    ///
    /// This ensures:
    /// 1. Exclusive lock prevents concurrent writes from two CLI processes
    /// 2. Atomic write (temp file + rename) prevents corruption on crash
    /// 3. Parent directory is created if needed
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        write_locked(path, &content)
    }

    /// Load configuration from `path`, or the global config when None.
    ///
    /// A missing global config is created from [`DEFAULT_CONFIG`]; a missing
    /// explicit path is an error.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Load global configuration from ~/.starless/config.toml
    /// If no config exists, auto-creates one with defaults.
    pub fn load() -> Result<Self> {
        let global_path = Self::global_config_path();

        if !global_path.exists() {
            if let Err(e) = Self::init_at(&global_path) {
                // Read-only home: run on defaults rather than refuse to start
                tracing::warn!("Could not create {}: {:#}", global_path.display(), e);
                return Ok(Self::default());
            }
        }

        Self::from_file(&global_path)
    }

    /// Write the commented default config to `path` unless a file is already there.
    ///
    /// Returns true if the file was created.
    pub fn init_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        write_locked(path, DEFAULT_CONFIG)?;
        eprintln!("Created {}", path.display());
        Ok(true)
    }
}

fn write_locked(path: &Path, content: &str) -> Result<()> {
    atomic::write_locked(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}
