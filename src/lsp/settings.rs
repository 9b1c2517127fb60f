//! Layered settings loading for the LSP session.
//!
//! Precedence, lowest to highest: programmed defaults, user config
//! (XDG), project config (`<root>/seisho.toml`), then whatever the
//! client sent as initialization options. Loading never fails the
//! session; problems are collected as events for the caller to log.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::{
    FormatterSettings, WorkspaceSettings, default_settings, load_user_config, merge_all,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsSource {
    InitializationOptions,
    ClientConfiguration,
}

impl SettingsSource {
    fn description(self) -> &'static str {
        match self {
            SettingsSource::InitializationOptions => "initialization options",
            SettingsSource::ClientConfiguration => "client configuration",
        }
    }
}

#[derive(Debug)]
pub struct SettingsLoadOutcome {
    pub settings: WorkspaceSettings,
    pub events: Vec<SettingsEvent>,
}

pub fn load_settings(
    root_path: Option<&Path>,
    override_settings: Option<(SettingsSource, Value)>,
) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    // Layer 1: programmed defaults (lowest precedence)
    let defaults = Some(default_settings());

    // Layer 2: user config from XDG_CONFIG_HOME (~/.config/seisho/seisho.toml)
    let user_config = load_user_config_with_events(&mut events);

    // Layer 3: project config from root_path/seisho.toml
    let project_settings = load_toml_settings(root_path, &mut events);

    // Layer 4: override settings from the client
    let override_settings = override_settings
        .and_then(|(source, value)| parse_override_settings(source, value, &mut events));

    let merged = merge_all(&[defaults, user_config, project_settings, override_settings]);
    let settings = merged.map(WorkspaceSettings::from).unwrap_or_default();

    SettingsLoadOutcome { settings, events }
}

fn load_user_config_with_events(events: &mut Vec<SettingsEvent>) -> Option<FormatterSettings> {
    match load_user_config() {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info(
                "Loaded user config from XDG_CONFIG_HOME",
            ));
            Some(settings)
        }
        // No user config file exists - this is fine (zero-config experience)
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load user config: {}",
                err
            )));
            None
        }
    }
}

fn load_toml_settings(
    root_path: Option<&Path>,
    events: &mut Vec<SettingsEvent>,
) -> Option<FormatterSettings> {
    let config_path = root_path?.join("seisho.toml");
    if !config_path.exists() {
        return None;
    }

    match fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<FormatterSettings>(&contents) {
            Ok(settings) => {
                events.push(SettingsEvent::info(format!(
                    "Loaded project config from {}",
                    config_path.display()
                )));
                Some(settings)
            }
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Failed to parse {}: {}",
                    config_path.display(),
                    err
                )));
                None
            }
        },
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to read {}: {}",
                config_path.display(),
                err
            )));
            None
        }
    }
}

fn parse_override_settings(
    source: SettingsSource,
    value: Value,
    events: &mut Vec<SettingsEvent>,
) -> Option<FormatterSettings> {
    if value.is_null() {
        return None;
    }

    match serde_json::from_value::<FormatterSettings>(value) {
        Ok(settings) => {
            events.push(SettingsEvent::info(format!(
                "Applied settings from {}",
                source.description()
            )));
            Some(settings)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Invalid settings in {}: {}",
                source.description(),
                err
            )));
            None
        }
    }
}
