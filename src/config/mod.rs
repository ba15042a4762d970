//! Configuration loading and management

mod io;
mod logging;
mod runner;
mod storage;

pub use io::DEFAULT_CONFIG;
pub use logging::LoggingConfig;
pub use runner::RunnerConfig;
pub use storage::{StorageConfig, StorageKind};

use serde::{Deserialize, Serialize};

/// Main configuration structure (~/.starless/config.toml)
///
/// This holds how Starless runs. The user's own settings (tool path, output
/// name, ...) live in the settings store, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where user settings are persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// How starnet++ is invoked
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            backend = "toml"

            [runner]
            stride = 128
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageKind::Toml);
        assert_eq!(config.runner.stride, 128);
        assert_eq!(config.runner.input_extension, "tiff");
        assert_eq!(config.runner.stdin_nudge_every, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[storage]\nbackend = \"redis\"\n");
        assert!(result.is_err());
    }
}
