use serde::{Deserialize, Serialize};

use super::setting_key::ValueKind;

/// A single setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Flag(bool),
    Text(String),
}

impl SettingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Text(_) => ValueKind::Text,
            SettingValue::Flag(_) => ValueKind::Flag,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            SettingValue::Flag(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Flag(b) => Some(*b),
            SettingValue::Text(_) => None,
        }
    }

    /// Storage encoding: strings as-is, booleans as `true`/`false`
    pub fn encode(&self) -> String {
        match self {
            SettingValue::Text(s) => s.clone(),
            SettingValue::Flag(b) => b.to_string(),
        }
    }

    /// Decode a stored string into a value of the given kind.
    ///
    /// Returns `None` when a boolean is not exactly `true` or `false`.
    pub fn decode(kind: ValueKind, raw: &str) -> Option<Self> {
        match kind {
            ValueKind::Text => Some(SettingValue::Text(raw.to_string())),
            ValueKind::Flag => match raw {
                "true" => Some(SettingValue::Flag(true)),
                "false" => Some(SettingValue::Flag(false)),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Flag(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flag_is_strict() {
        assert_eq!(
            SettingValue::decode(ValueKind::Flag, "true"),
            Some(SettingValue::Flag(true))
        );
        assert_eq!(SettingValue::decode(ValueKind::Flag, "TRUE"), None);
        assert_eq!(SettingValue::decode(ValueKind::Flag, "1"), None);
    }

    #[test]
    fn test_text_keeps_whitespace() {
        let value = SettingValue::decode(ValueKind::Text, "  spaced ").unwrap();
        assert_eq!(value.as_str(), Some("  spaced "));
        assert_eq!(value.encode(), "  spaced ");
    }
}
