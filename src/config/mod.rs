pub mod defaults;
pub mod settings;
pub mod user;

pub use defaults::{
    DEFAULT_CHANGE_DEBOUNCE_MS, DEFAULT_COMMAND, DEFAULT_SAVE_DEBOUNCE_MS, default_settings,
};
pub use settings::{FormatterSettings, WorkspaceSettings};
pub use user::{load_user_config, user_config_path};

/// Merge two FormatterSettings, preferring values from `primary` over `fallback`.
pub fn merge_settings(
    fallback: Option<FormatterSettings>,
    primary: Option<FormatterSettings>,
) -> Option<FormatterSettings> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) => Some(settings),
        (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(FormatterSettings {
            command: primary.command.or(fallback.command),
            args: primary.args.or(fallback.args),
            validate_on_type: primary.validate_on_type.or(fallback.validate_on_type),
            change_debounce_ms: primary.change_debounce_ms.or(fallback.change_debounce_ms),
            save_debounce_ms: primary.save_debounce_ms.or(fallback.save_debounce_ms),
        }),
    }
}

/// Merge configuration layers in precedence order: earlier entries are
/// fallbacks, later entries override them.
pub fn merge_all(layers: &[Option<FormatterSettings>]) -> Option<FormatterSettings> {
    layers
        .iter()
        .cloned()
        .fold(None, |merged, layer| merge_settings(merged, layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_command(command: &str) -> FormatterSettings {
        FormatterSettings {
            command: Some(command.to_string()),
            ..FormatterSettings::default()
        }
    }

    #[test]
    fn merge_prefers_primary_fields() {
        let fallback = FormatterSettings {
            command: Some("lua-format".to_string()),
            change_debounce_ms: Some(500),
            ..FormatterSettings::default()
        };
        let primary = FormatterSettings {
            command: Some("stylua".to_string()),
            ..FormatterSettings::default()
        };

        let merged = merge_settings(Some(fallback), Some(primary)).expect("merged settings");
        assert_eq!(merged.command.as_deref(), Some("stylua"));
        // Unset primary fields fall back
        assert_eq!(merged.change_debounce_ms, Some(500));
    }

    #[test]
    fn merge_all_applies_layers_in_order() {
        let merged = merge_all(&[
            Some(with_command("first")),
            None,
            Some(with_command("last")),
        ])
        .expect("merged settings");
        assert_eq!(merged.command.as_deref(), Some("last"));
    }

    #[test]
    fn merge_all_of_empty_layers_is_none() {
        assert_eq!(merge_all(&[None, None]), None);
    }
}
