//! Published diagnostic state, one entry per open document.
//!
//! The store is the single mutation surface for diagnostic state: the
//! validation completion handler and the explicit formatting path write
//! to it, the client renders whatever was last published. Last write
//! wins, nothing is merged. Closing a document removes its entry
//! entirely so a late in-flight result cannot recreate it.

use dashmap::DashMap;
use tower_lsp_server::ls_types::{Diagnostic, DiagnosticSeverity, Position, Range};
use url::Url;

use crate::formatter::PositionedError;

/// Diagnostic source label shown next to each message in the client.
const SOURCE: &str = "seisho";

/// Convert parsed stderr records into LSP diagnostics.
///
/// Positions are already 0-based; the range is zero-width at the reported
/// position, which clients render as a marker on that character.
pub(crate) fn into_diagnostics(errors: Vec<PositionedError>) -> Vec<Diagnostic> {
    errors
        .into_iter()
        .map(|err| Diagnostic {
            range: Range {
                start: Position::new(err.line, err.column),
                end: Position::new(err.line, err.column),
            },
            severity: Some(DiagnosticSeverity::ERROR),
            source: Some(SOURCE.to_string()),
            message: err.message,
            ..Diagnostic::default()
        })
        .collect()
}

/// Per-document published diagnostics, keyed by document identity.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticsStore {
    published: DashMap<Url, Vec<Diagnostic>>,
}

impl DiagnosticsStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace the diagnostics for a document.
    pub(crate) fn set(&self, uri: &Url, diagnostics: Vec<Diagnostic>) {
        self.published.insert(uri.clone(), diagnostics);
    }

    /// Clear the diagnostics for a document (store an empty set).
    pub(crate) fn clear(&self, uri: &Url) {
        self.published.insert(uri.clone(), Vec::new());
    }

    /// Delete the document's diagnostic state on close.
    pub(crate) fn remove(&self, uri: &Url) {
        self.published.remove(uri);
    }

    #[cfg(test)]
    pub(crate) fn get(&self, uri: &Url) -> Option<Vec<Diagnostic>> {
        self.published.get(uri).map(|entry| entry.clone())
    }

    #[cfg(test)]
    pub(crate) fn document_count(&self) -> usize {
        self.published.len()
    }
}
