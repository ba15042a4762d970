use serde::{Deserialize, Serialize};

use super::{SettingKey, SettingValue};

/// Snapshot of every user setting
///
/// This is a plain copy. The [`SettingsStore`](crate::store::SettingsStore)
/// stays the source of truth; take a fresh snapshot instead of caching one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Filesystem path to the starnet++ executable
    #[serde(default)]
    pub tool_path: String,

    /// Base name used for generated output (without extension)
    #[serde(default = "default_output_filename")]
    pub output_filename: String,

    /// Scratch input file staged next to the tool (without extension)
    #[serde(default = "default_temp_file_name")]
    pub temp_file_name: String,

    /// Whether the log view follows new output
    #[serde(default)]
    pub auto_scroll: bool,
}

fn default_output_filename() -> String {
    "starless".to_string()
}

fn default_temp_file_name() -> String {
    "starnetTempInput".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool_path: String::new(),
            output_filename: default_output_filename(),
            temp_file_name: default_temp_file_name(),
            auto_scroll: false,
        }
    }
}

impl Settings {
    /// Read one field as a [`SettingValue`]
    pub fn value(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::ToolPath => SettingValue::Text(self.tool_path.clone()),
            SettingKey::OutputFilename => SettingValue::Text(self.output_filename.clone()),
            SettingKey::TempFileName => SettingValue::Text(self.temp_file_name.clone()),
            SettingKey::AutoScroll => SettingValue::Flag(self.auto_scroll),
        }
    }

    /// Overwrite one field. Returns `false` (and leaves the record untouched)
    /// when the value kind does not match the key.
    pub fn apply(&mut self, key: SettingKey, value: &SettingValue) -> bool {
        match (key, value) {
            (SettingKey::ToolPath, SettingValue::Text(s)) => self.tool_path.clone_from(s),
            (SettingKey::OutputFilename, SettingValue::Text(s)) => {
                self.output_filename.clone_from(s)
            }
            (SettingKey::TempFileName, SettingValue::Text(s)) => {
                self.temp_file_name.clone_from(s)
            }
            (SettingKey::AutoScroll, SettingValue::Flag(b)) => self.auto_scroll = *b,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_key_defaults() {
        let settings = Settings::default();
        for key in SettingKey::ALL {
            assert_eq!(settings.value(key), key.default_value(), "{key}");
        }
    }

    #[test]
    fn test_apply_rejects_wrong_kind() {
        let mut settings = Settings::default();
        assert!(!settings.apply(SettingKey::AutoScroll, &SettingValue::from("yes")));
        assert!(!settings.apply(SettingKey::ToolPath, &SettingValue::Flag(true)));
        assert_eq!(settings, Settings::default());

        assert!(settings.apply(SettingKey::AutoScroll, &SettingValue::Flag(true)));
        assert!(settings.auto_scroll);
    }

    #[test]
    fn test_serializes_with_persisted_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["outputFilename"], "starless");
        assert_eq!(json["tempFileName"], "starnetTempInput");
        assert_eq!(json["autoScroll"], false);
    }
}
