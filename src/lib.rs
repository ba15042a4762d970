//! Starless - settings and runner for starnet++
//!
//! Starless keeps the user's starnet++ preferences (where the tool lives,
//! what to call the output, which scratch file to stage, whether the log
//! view follows output) in a persisted, observable settings store, and runs
//! the tool with them.
//!
//! ## Pieces
//!
//! 1. **Store**: [`store::SettingsStore`] is a cloneable handle that reads
//!    and writes settings with write-through to a [`storage`] backend and
//!    notifies subscribers on every write.
//!
//! 2. **Runner**: [`starnet::StarnetRunner`] spawns the tool from the
//!    current settings and streams its output as [`LogEvent`]s.

pub mod config;
pub mod domain;
pub mod starnet;
pub mod storage;
pub mod store;

pub use domain::*;
