//! Settings management for the server.
//!
//! Consolidates workspace settings, client capabilities, and the root
//! path into one struct so the rest of the server never touches raw
//! configuration layers.
//!
//! # Thread Safety
//!
//! - `ArcSwap` for atomic updates to settings and root_path
//! - `OnceLock` for one-time initialization of capabilities

use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tower_lsp_server::ls_types::ClientCapabilities;

use crate::config::WorkspaceSettings;

pub(crate) struct SettingsManager {
    root_path: ArcSwap<Option<PathBuf>>,
    settings: ArcSwap<WorkspaceSettings>,
    /// Client capabilities from initialize() - immutable after initialization.
    client_capabilities: OnceLock<ClientCapabilities>,
}

impl std::fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("root_path", &"ArcSwap<Option<PathBuf>>")
            .field("settings", &"ArcSwap<WorkspaceSettings>")
            .field("client_capabilities", &"OnceLock<ClientCapabilities>")
            .finish()
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManager {
    pub(crate) fn new() -> Self {
        Self {
            root_path: ArcSwap::new(Arc::new(None)),
            settings: ArcSwap::new(Arc::new(WorkspaceSettings::default())),
            client_capabilities: OnceLock::new(),
        }
    }

    /// Store client capabilities from initialize().
    ///
    /// The LSP spec guarantees initialize() happens exactly once per
    /// session; a second call is ignored (OnceLock semantics).
    pub(crate) fn set_capabilities(&self, caps: ClientCapabilities) {
        let _ = self.client_capabilities.set(caps);
    }

    #[cfg(test)]
    pub(crate) fn client_capabilities(&self) -> Option<&ClientCapabilities> {
        self.client_capabilities.get()
    }

    /// Set the workspace root path determined during initialize().
    pub(crate) fn set_root_path(&self, path: Option<PathBuf>) {
        self.root_path.store(Arc::new(path));
    }

    pub(crate) fn root_path(&self) -> Arc<Option<PathBuf>> {
        self.root_path.load_full()
    }

    /// Load the current workspace settings.
    pub(crate) fn load_settings(&self) -> Arc<WorkspaceSettings> {
        self.settings.load_full()
    }

    /// Apply new workspace settings.
    pub(crate) fn apply_settings(&self, settings: WorkspaceSettings) {
        self.settings.store(Arc::new(settings));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_default_state() {
        let manager = SettingsManager::new();

        assert!(manager.root_path().is_none());
        assert!(manager.client_capabilities().is_none());
        assert_eq!(*manager.load_settings(), WorkspaceSettings::default());
    }

    #[test]
    fn set_and_get_root_path() {
        let manager = SettingsManager::new();
        let path = PathBuf::from("/test/path");

        manager.set_root_path(Some(path.clone()));

        assert_eq!(manager.root_path().as_ref(), &Some(path));
    }

    #[test]
    fn set_capabilities_is_idempotent() {
        let manager = SettingsManager::new();

        manager.set_capabilities(ClientCapabilities::default());
        manager.set_capabilities(ClientCapabilities::default());

        assert!(manager.client_capabilities().is_some());
    }

    #[test]
    fn apply_and_load_settings() {
        let manager = SettingsManager::new();
        let settings = WorkspaceSettings {
            command: "stylua".to_string(),
            ..WorkspaceSettings::default()
        };

        manager.apply_settings(settings.clone());

        assert_eq!(*manager.load_settings(), settings);
    }
}
