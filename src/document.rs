//! Open document tracking.
//!
//! The server advertises full text synchronization, so a document is just
//! the latest full text plus the version the client reported. Text is
//! snapshotted (cloned) out of the store before a formatter runs, so an
//! in-flight validation never observes a half-applied edit.

use dashmap::DashMap;
use url::Url;

/// A single open document.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    version: i32,
}

impl Document {
    pub fn new(text: String, version: i32) -> Self {
        Self { text, version }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

/// Store of open documents, keyed by URI.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document (didOpen).
    pub fn open(&self, uri: Url, text: String, version: i32) {
        self.documents.insert(uri, Document::new(text, version));
    }

    /// Replace a document's text (didChange/didSave with full sync).
    ///
    /// A change event for an unknown document is ignored; the client is
    /// out of sync and a later didOpen will resynchronize.
    pub fn update(&self, uri: &Url, text: String, version: i32) {
        if let Some(mut doc) = self.documents.get_mut(uri) {
            *doc = Document::new(text, version);
        }
    }

    /// Snapshot the current text of a document.
    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.text().to_string())
    }

    /// The version the client last reported for a document.
    pub fn version(&self, uri: &Url) -> Option<i32> {
        self.documents.get(uri).map(|doc| doc.version())
    }

    /// Remove a document (didClose). Returns true if it was present.
    pub fn close(&self, uri: &Url) -> bool {
        self.documents.remove(uri).is_some()
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn open_update_close_roundtrip() {
        let store = DocumentStore::new();
        let doc = uri("file:///init.lua");

        store.open(doc.clone(), "a=1\n".to_string(), 1);
        assert_eq!(store.text(&doc).as_deref(), Some("a=1\n"));

        store.update(&doc, "a = 1\n".to_string(), 2);
        assert_eq!(store.text(&doc).as_deref(), Some("a = 1\n"));

        assert!(store.close(&doc));
        assert!(store.text(&doc).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn update_for_unknown_document_is_ignored() {
        let store = DocumentStore::new();
        let doc = uri("file:///missing.lua");

        store.update(&doc, "text".to_string(), 1);
        assert!(!store.contains(&doc));
    }
}
