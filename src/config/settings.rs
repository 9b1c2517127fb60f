use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    DEFAULT_CHANGE_DEBOUNCE_MS, DEFAULT_COMMAND, DEFAULT_SAVE_DEBOUNCE_MS, default_settings,
};

/// Raw, partial settings as they appear in a TOML file or in LSP
/// initialization options. Every field is optional so that layers can be
/// merged with later layers overriding earlier ones.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormatterSettings {
    /// Formatter binary path or bare command name resolved via PATH
    pub command: Option<String>,
    /// Extra arguments passed to the formatter on every invocation
    pub args: Option<Vec<String>>,
    /// Whether didChange events trigger background validation
    pub validate_on_type: Option<bool>,
    /// Debounce for keystroke-level changes, in milliseconds
    pub change_debounce_ms: Option<u64>,
    /// Debounce for open/save events, in milliseconds
    pub save_debounce_ms: Option<u64>,
}

/// Fully resolved settings the server operates on.
///
/// Produced by merging all configuration layers and filling the gaps with
/// programmed defaults, so the rest of the code never deals with `Option`s.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceSettings {
    pub command: String,
    pub args: Vec<String>,
    pub validate_on_type: bool,
    pub change_debounce: Duration,
    pub save_debounce: Duration,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self::from(default_settings())
    }
}

impl From<FormatterSettings> for WorkspaceSettings {
    fn from(raw: FormatterSettings) -> Self {
        Self {
            command: raw.command.unwrap_or_else(|| DEFAULT_COMMAND.to_string()),
            args: raw.args.unwrap_or_default(),
            validate_on_type: raw.validate_on_type.unwrap_or(true),
            change_debounce: Duration::from_millis(
                raw.change_debounce_ms.unwrap_or(DEFAULT_CHANGE_DEBOUNCE_MS),
            ),
            save_debounce: Duration::from_millis(
                raw.save_debounce_ms.unwrap_or(DEFAULT_SAVE_DEBOUNCE_MS),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_resolve_to_defaults() {
        let resolved = WorkspaceSettings::from(FormatterSettings::default());
        assert_eq!(resolved.command, DEFAULT_COMMAND);
        assert!(resolved.args.is_empty());
        assert!(resolved.validate_on_type);
        assert_eq!(
            resolved.change_debounce,
            Duration::from_millis(DEFAULT_CHANGE_DEBOUNCE_MS)
        );
    }

    #[test]
    fn camel_case_toml_fields_deserialize() {
        let raw: FormatterSettings = toml::from_str(
            r#"
            command = "stylua"
            args = ["-"]
            validateOnType = false
            changeDebounceMs = 250
            "#,
        )
        .expect("valid settings TOML");

        assert_eq!(raw.command.as_deref(), Some("stylua"));
        assert_eq!(raw.args, Some(vec!["-".to_string()]));
        assert_eq!(raw.validate_on_type, Some(false));
        assert_eq!(raw.change_debounce_ms, Some(250));
        assert_eq!(raw.save_debounce_ms, None);
    }
}
