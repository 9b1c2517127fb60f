//! The seisho language server.
//!
//! Bridges LSP document lifecycle events to the external formatter:
//! opens/changes/saves schedule debounced background validation, close
//! tears the per-document state down, and `textDocument/formatting` runs
//! the formatter synchronously as an explicit user action (never
//! debounced, independent of the background validator).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, DocumentFormattingParams, InitializeParams, InitializeResult,
    InitializedParams, MessageType, OneOf, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextEdit, Uri,
};
use tower_lsp_server::{Client, LanguageServer};
use url::Url;

use crate::document::DocumentStore;
use crate::formatter::{FormatOutcome, FormatRequest, invoke, parse_stderr};
use crate::text::replacement_edits;

use super::diagnostics::{DiagnosticsStore, into_diagnostics};
use super::settings::{SettingsEventKind, SettingsSource, load_settings};
use super::settings_manager::SettingsManager;
use super::validation::{ValidationContext, ValidationScheduler};

const LOG_TARGET: &str = "seisho::lsp";

pub struct Seisho {
    client: Client,
    documents: DocumentStore,
    diagnostics: Arc<DiagnosticsStore>,
    validation: Arc<ValidationScheduler>,
    settings: SettingsManager,
}

impl std::fmt::Debug for Seisho {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seisho")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Convert an LSP URI into the url::Url used for internal state keys.
fn to_url(uri: &Uri) -> Option<Url> {
    Url::parse(uri.as_str()).ok()
}

impl Seisho {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            diagnostics: Arc::new(DiagnosticsStore::new()),
            validation: Arc::new(ValidationScheduler::new()),
            settings: SettingsManager::new(),
        }
    }

    /// Schedule a debounced background validation of the document's
    /// current text. A no-op for documents we do not track.
    fn schedule_validation(&self, lsp_uri: &Uri, delay: Duration) {
        let Some(uri) = to_url(lsp_uri) else {
            log::warn!(target: LOG_TARGET, "unparseable document URI {}", lsp_uri.as_str());
            return;
        };
        let Some(text) = self.documents.text(&uri) else {
            return;
        };
        let settings = self.settings.load_settings();

        let ctx = ValidationContext {
            working_dir: self.working_dir_for(&uri),
            uri,
            lsp_uri: lsp_uri.clone(),
            text,
            command: settings.command.clone(),
            args: settings.args.clone(),
            client: self.client.clone(),
            store: Arc::clone(&self.diagnostics),
        };
        Arc::clone(&self.validation).schedule(ctx, delay);
    }

    /// The directory the formatter runs in: the document's parent when it
    /// lives on the local filesystem, otherwise the workspace root.
    fn working_dir_for(&self, uri: &Url) -> Option<PathBuf> {
        uri.to_file_path()
            .ok()
            .and_then(|path| path.parent().map(|dir| dir.to_path_buf()))
            .or_else(|| (*self.settings.root_path()).clone())
    }
}

impl LanguageServer for Seisho {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.settings.set_capabilities(params.capabilities);

        // Root path from workspace folders, root_uri, or the current
        // working directory as a last resort.
        let root_path = if let Some(folder) = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
        {
            to_url(&folder.uri).and_then(|url| url.to_file_path().ok())
        } else {
            #[allow(deprecated)] // root_uri kept for older clients
            let root_uri = params.root_uri.as_ref().and_then(to_url);
            root_uri
                .and_then(|url| url.to_file_path().ok())
                .or_else(|| std::env::current_dir().ok())
        };
        self.settings.set_root_path(root_path.clone());

        let override_settings = params
            .initialization_options
            .map(|options| (SettingsSource::InitializationOptions, options));
        let outcome = load_settings(root_path.as_deref(), override_settings);

        for event in &outcome.events {
            let message_type = match event.kind {
                SettingsEventKind::Info => MessageType::INFO,
                SettingsEventKind::Warning => MessageType::WARNING,
            };
            self.client.log_message(message_type, &event.message).await;
        }
        log::info!(
            target: LOG_TARGET,
            "using formatter command '{}'",
            outcome.settings.command
        );
        self.settings.apply_settings(outcome.settings);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                document_formatting_provider: Some(OneOf::Left(true)),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "seisho".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "seisho initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.validation.cancel_all();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Some(uri) = to_url(&lsp_uri) else {
            return;
        };

        self.documents.open(
            uri.clone(),
            params.text_document.text,
            params.text_document.version,
        );
        self.validation.track(uri);

        // Open shares the save debounce: short, for snappy first feedback
        let delay = self.settings.load_settings().save_debounce;
        self.schedule_validation(&lsp_uri, delay);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Some(uri) = to_url(&lsp_uri) else {
            return;
        };

        // Full sync: each change event carries the whole document
        for change in params.content_changes {
            if change.range.is_some() {
                log::warn!(
                    target: LOG_TARGET,
                    "ignoring incremental change for {uri}; full sync was negotiated"
                );
                continue;
            }
            self.documents
                .update(&uri, change.text, params.text_document.version);
        }

        let settings = self.settings.load_settings();
        if settings.validate_on_type {
            // Long debounce per keystroke to avoid flooding the formatter
            self.schedule_validation(&lsp_uri, settings.change_debounce);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Some(uri) = to_url(&lsp_uri) else {
            return;
        };

        if let Some(text) = params.text {
            let version = self.documents.version(&uri).unwrap_or_default();
            self.documents.update(&uri, text, version);
        }

        let delay = self.settings.load_settings().save_debounce;
        self.schedule_validation(&lsp_uri, delay);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let lsp_uri = params.text_document.uri;
        let Some(uri) = to_url(&lsp_uri) else {
            return;
        };

        // Tear down in the order that makes a late in-flight result a
        // no-op: scheduler state first, then the published diagnostics.
        self.validation.discard(&uri);
        self.diagnostics.remove(&uri);
        self.documents.close(&uri);

        // Retract anything still rendered in the client
        self.client
            .publish_diagnostics(lsp_uri, Vec::new(), None)
            .await;
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let lsp_uri = params.text_document.uri;
        let Some(uri) = to_url(&lsp_uri) else {
            return Ok(None);
        };
        let Some(text) = self.documents.text(&uri) else {
            log::debug!(target: LOG_TARGET, "formatting requested for unknown document {uri}");
            return Ok(None);
        };

        let settings = self.settings.load_settings();
        let request =
            FormatRequest::new(text.clone()).with_working_dir(self.working_dir_for(&uri));

        let outcome = invoke(&request, &settings.command, &settings.args).await;

        // The document may have closed while the formatter ran; its state
        // was torn down and a late result must not recreate it.
        if !self.documents.contains(&uri) {
            log::debug!(target: LOG_TARGET, "dropping format result for closed {uri}");
            return Ok(None);
        }

        match outcome {
            Ok(FormatOutcome::Formatted(formatted)) => {
                self.diagnostics.clear(&uri);
                self.client
                    .publish_diagnostics(lsp_uri, Vec::new(), None)
                    .await;

                let edits = replacement_edits(&text, &formatted);
                if edits.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(edits))
                }
            }
            Ok(FormatOutcome::Failed { stderr, exit_code }) => {
                let errors = parse_stderr(&stderr);
                if errors.is_empty() {
                    // Unknown-shape failure: no positions to render, so
                    // clear diagnostics and tell the user once.
                    self.diagnostics.clear(&uri);
                    self.client
                        .publish_diagnostics(lsp_uri, Vec::new(), None)
                        .await;
                    self.client
                        .show_message(
                            MessageType::ERROR,
                            format!(
                                "'{}' failed (status {exit_code}): {}. \
                                 Check the formatter installation and configured path.",
                                settings.command,
                                stderr.trim()
                            ),
                        )
                        .await;
                } else {
                    // Positional diagnostics already inform the user
                    let diagnostics = into_diagnostics(errors);
                    self.diagnostics.set(&uri, diagnostics.clone());
                    self.client
                        .publish_diagnostics(lsp_uri, diagnostics, None)
                        .await;
                }
                Ok(None)
            }
            Err(err) => {
                self.diagnostics.clear(&uri);
                self.client
                    .publish_diagnostics(lsp_uri, Vec::new(), None)
                    .await;
                self.client
                    .show_message(MessageType::ERROR, err.remediation(&settings.command))
                    .await;
                Ok(None)
            }
        }
    }
}
