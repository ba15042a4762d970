//! Log output settings

use serde::{Deserialize, Serialize};

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set (e.g., "info", "starless=debug")
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl LoggingConfig {
    /// Filter to use, with `--verbose` forcing debug
    pub fn effective_level(&self, verbose: bool) -> &str {
        if verbose {
            "debug"
        } else if self.level.trim().is_empty() {
            "info"
        } else {
            self.level.trim()
        }
    }
}
