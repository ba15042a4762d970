use serde::{Deserialize, Serialize};

use super::SettingValue;

/// The kind of value a setting holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Flag,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Text => write!(f, "string"),
            ValueKind::Flag => write!(f, "boolean"),
        }
    }
}

/// Every setting the store knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SettingKey {
    /// Filesystem path to the starnet++ executable
    #[serde(rename = "toolPath")]
    ToolPath,
    /// Base name used for generated output
    #[serde(rename = "outputFilename")]
    OutputFilename,
    /// Scratch input file staged next to the tool
    #[serde(rename = "tempFileName")]
    TempFileName,
    /// Whether the log view follows new output
    #[serde(rename = "autoScroll")]
    AutoScroll,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ToolPath,
        SettingKey::OutputFilename,
        SettingKey::TempFileName,
        SettingKey::AutoScroll,
    ];

    /// Key under which the value is persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ToolPath => "toolPath",
            SettingKey::OutputFilename => "outputFilename",
            SettingKey::TempFileName => "tempFileName",
            SettingKey::AutoScroll => "autoScroll",
        }
    }

    /// Name used by earlier releases, still honoured when reading
    pub fn legacy_name(&self) -> Option<&'static str> {
        match self {
            SettingKey::ToolPath => Some("starnetPath"),
            SettingKey::TempFileName => Some("tempFile"),
            SettingKey::OutputFilename | SettingKey::AutoScroll => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            SettingKey::AutoScroll => ValueKind::Flag,
            _ => ValueKind::Text,
        }
    }

    pub fn default_value(&self) -> SettingValue {
        match self {
            SettingKey::ToolPath => SettingValue::Text(String::new()),
            SettingKey::OutputFilename => SettingValue::Text("starless".to_string()),
            SettingKey::TempFileName => SettingValue::Text("starnetTempInput".to_string()),
            SettingKey::AutoScroll => SettingValue::Flag(false),
        }
    }

    /// Resolve a key from its persisted name, a legacy name, or the snake_case
    /// field name. Matching is exact apart from the snake_case form.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| {
            key.as_str() == name
                || key.legacy_name() == Some(name)
                || key.field_name() == name
        })
    }

    /// snake_case field name in [`Settings`](super::Settings)
    pub fn field_name(&self) -> &'static str {
        match self {
            SettingKey::ToolPath => "tool_path",
            SettingKey::OutputFilename => "output_filename",
            SettingKey::TempFileName => "temp_file_name",
            SettingKey::AutoScroll => "auto_scroll",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_accepts_all_spellings() {
        assert_eq!(SettingKey::from_name("toolPath"), Some(SettingKey::ToolPath));
        assert_eq!(SettingKey::from_name("starnetPath"), Some(SettingKey::ToolPath));
        assert_eq!(SettingKey::from_name("tool_path"), Some(SettingKey::ToolPath));
        assert_eq!(SettingKey::from_name("tempFile"), Some(SettingKey::TempFileName));
        assert_eq!(SettingKey::from_name("autoScroll"), Some(SettingKey::AutoScroll));
        assert_eq!(SettingKey::from_name("autoscroll"), None);
        assert_eq!(SettingKey::from_name(""), None);
    }

    #[test]
    fn test_defaults_match_kind() {
        for key in SettingKey::ALL {
            assert_eq!(key.default_value().kind(), key.kind(), "{key}");
        }
    }
}
