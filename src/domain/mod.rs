//! Core domain types for Starless

mod log_event;
mod setting_key;
mod setting_value;
mod settings;

pub use log_event::{LogEvent, LogEventKind};
pub use setting_key::{SettingKey, ValueKind};
pub use setting_value::SettingValue;
pub use settings::Settings;
