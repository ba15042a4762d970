//! Settings for invoking starnet++

use serde::{Deserialize, Serialize};

/// Runner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Extension for the staged input and the output image
    /// Default: "tiff" (the only format starnet++ reads)
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Tile stride passed to starnet++
    /// Default: 256
    #[serde(default = "default_stride")]
    pub stride: u32,

    /// Write `nudge_message` to the tool's stdin after every N output events.
    /// starnet++ may wait for a key press; 0 disables nudging.
    #[serde(default = "default_stdin_nudge_every")]
    pub stdin_nudge_every: u32,

    /// What to write on a nudge
    #[serde(default = "default_nudge_message")]
    pub nudge_message: String,
}

fn default_input_extension() -> String {
    "tiff".to_string()
}

fn default_stride() -> u32 {
    256
}

fn default_stdin_nudge_every() -> u32 {
    4
}

fn default_nudge_message() -> String {
    "\n".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            input_extension: default_input_extension(),
            stride: default_stride(),
            stdin_nudge_every: default_stdin_nudge_every(),
            nudge_message: default_nudge_message(),
        }
    }
}
