//! Invoking the starnet++ star removal tool
//!
//! The settings store provides the tool path and file names; this module
//! turns them into a command line, runs it, and streams output as
//! [`LogEvent`](crate::LogEvent)s.

mod invocation;
mod registry;
mod runner;

pub use invocation::Invocation;
pub use registry::{kill_pid, ProcessRegistry, RunningProcess};
pub use runner::{RunOutcome, StarnetRunner, ToolRunner};

use std::path::PathBuf;

use crate::config::RunnerConfig;
use crate::store::SettingsStore;

/// Errors from preparing or running the tool
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("No starnet++ executable configured (set toolPath)")]
    ToolNotConfigured,

    #[error("starnet++ executable not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("Invalid {setting}: {value:?}")]
    InvalidFileName { setting: &'static str, value: String },

    #[error("Input image not found: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to kill pid {pid}: {reason}")]
    Kill { pid: u32, reason: String },
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Build an invocation from the store's current values
pub fn invocation_for(
    store: &SettingsStore,
    runner: &RunnerConfig,
) -> Result<Invocation, RunError> {
    Invocation::from_settings(&store.snapshot(), runner)
}
