//! Default configuration values for seisho.

use super::settings::FormatterSettings;

/// Default formatter binary, resolved via PATH.
pub const DEFAULT_COMMAND: &str = "lua-format";

/// Debounce applied to keystroke-level changes (hundreds of ms so rapid
/// typing does not flood the external process).
pub const DEFAULT_CHANGE_DEBOUNCE_MS: u64 = 500;

/// Debounce applied to save events, and to open (the first validation
/// after a document appears wants the same snappy tens-of-ms delay).
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 50;

/// Returns the default FormatterSettings used as the lowest-precedence
/// configuration layer.
pub fn default_settings() -> FormatterSettings {
    FormatterSettings {
        command: Some(DEFAULT_COMMAND.to_string()),
        args: Some(Vec::new()),
        validate_on_type: Some(true),
        change_debounce_ms: Some(DEFAULT_CHANGE_DEBOUNCE_MS),
        save_debounce_ms: Some(DEFAULT_SAVE_DEBOUNCE_MS),
    }
}
