mod diagnostics;
mod lsp_impl;
mod settings;
mod settings_manager;
mod validation;

pub use lsp_impl::Seisho;
pub use settings::{
    SettingsEvent, SettingsEventKind, SettingsLoadOutcome, SettingsSource, load_settings,
};
