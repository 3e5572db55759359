//! Edit submission boundary
//!
//! The host applies a `WorkspaceEdit` all-or-nothing. Everything that mutates
//! documents on the client goes through [`EditSink`] as one batch.

use async_trait::async_trait;
use tower_lsp::Client;
use tower_lsp::lsp_types::{
    DocumentChanges, OneOf, OptionalVersionedTextDocumentIdentifier, TextDocumentEdit, TextEdit,
    WorkspaceEdit,
};
use tracing::debug;

use crate::document::Document;
use crate::lsp::error::EditError;

/// Submits workspace edits to the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EditSink: Send + Sync {
    async fn apply(&self, edit: WorkspaceEdit) -> Result<(), EditError>;
}

/// Sends edits with `workspace/applyEdit`
pub struct ClientEditSink {
    client: Client,
}

impl ClientEditSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EditSink for ClientEditSink {
    async fn apply(&self, edit: WorkspaceEdit) -> Result<(), EditError> {
        let response = self
            .client
            .apply_edit(edit)
            .await
            .map_err(|e| EditError::Request(e.to_string()))?;

        if !response.applied {
            return Err(EditError::Rejected(
                response
                    .failure_reason
                    .unwrap_or_else(|| "no reason given".to_string()),
            ));
        }

        debug!("Client applied workspace edit");
        Ok(())
    }
}

/// Builds a single-document edit batch fenced to the document's current version
pub fn document_edit(document: &Document, edits: Vec<TextEdit>) -> WorkspaceEdit {
    WorkspaceEdit {
        document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
            text_document: OptionalVersionedTextDocumentIdentifier {
                uri: document.uri().clone(),
                version: Some(document.version()),
            },
            edits: edits.into_iter().map(OneOf::Left).collect(),
        }])),
        ..Default::default()
    }
}
