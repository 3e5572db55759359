//! Open document store

use indexmap::IndexMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};
use tracing::debug;

use crate::document::error::DocumentError;
use crate::document::types::Document;

/// Authoritative state for every open document, kept in open order
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: IndexMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, uri: Url, text: String, version: i32) -> Result<(), DocumentError> {
        if self.documents.contains_key(&uri) {
            return Err(DocumentError::AlreadyOpen(uri));
        }

        debug!("Opening {} at version {}", uri, version);
        self.documents
            .insert(uri.clone(), Document::new(uri, text, version));
        Ok(())
    }

    /// Applies `changes` in order and moves the document to `version`.
    ///
    /// Versions must strictly increase; a stale version leaves the document
    /// untouched.
    pub fn apply_changes(
        &mut self,
        uri: &Url,
        version: i32,
        changes: Vec<TextDocumentContentChangeEvent>,
    ) -> Result<&Document, DocumentError> {
        let document = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| DocumentError::NotFound(uri.clone()))?;

        if version <= document.version() {
            return Err(DocumentError::StaleVersion {
                uri: uri.clone(),
                current: document.version(),
                received: version,
            });
        }

        for change in changes {
            document.apply_change(change);
        }
        document.set_version(version);
        debug!("Updated {} to version {}", uri, version);

        Ok(document)
    }

    pub fn close(&mut self, uri: &Url) -> Result<Document, DocumentError> {
        self.documents
            .shift_remove(uri)
            .ok_or_else(|| DocumentError::NotFound(uri.clone()))
    }

    pub fn get(&self, uri: &Url) -> Result<&Document, DocumentError> {
        self.documents
            .get(uri)
            .ok_or_else(|| DocumentError::NotFound(uri.clone()))
    }

    /// Uris of all open documents, in open order
    pub fn uris(&self) -> Vec<Url> {
        self.documents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
