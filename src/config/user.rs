//! User configuration loading for seisho.
//!
//! User config location: $XDG_CONFIG_HOME/seisho/seisho.toml
//! Fallback: ~/.config/seisho/seisho.toml

use std::path::PathBuf;

use super::settings::FormatterSettings;

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/seisho/seisho.toml
/// 2. Otherwise: <platform config dir>/seisho/seisho.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("seisho").join("seisho.toml"));
    }

    dirs::config_dir().map(|dir| dir.join("seisho").join("seisho.toml"))
}

/// Load the user-wide configuration file, if one exists.
///
/// Returns `Ok(None)` when the file does not exist (zero-config
/// experience); an error string when the file exists but cannot be read
/// or parsed.
pub fn load_user_config() -> Result<Option<FormatterSettings>, String> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;

    toml::from_str::<FormatterSettings>(&contents)
        .map(Some)
        .map_err(|err| format!("failed to parse {}: {}", path.display(), err))
}
