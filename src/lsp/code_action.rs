//! Quick fixes for uppercase-word diagnostics

use tower_lsp::lsp_types::{
    CodeAction, CodeActionContext, CodeActionKind, CodeActionOrCommand, TextEdit,
};

use crate::document::Document;
use crate::lsp::diagnostics::DIAGNOSTIC_SOURCE;
use crate::lsp::edit::document_edit;

const LOWERCASE_FIX_TITLE: &str = "Fix to lower case";

/// Whether the request asked for quick fixes. Only the first requested kind
/// is considered, and it must be exactly `quickfix`.
fn requests_quick_fix(context: &CodeActionContext) -> bool {
    context
        .only
        .as_ref()
        .and_then(|only| only.first())
        .is_some_and(|kind| *kind == CodeActionKind::QUICKFIX)
}

/// Builds one lowercase-replacement action per diagnostic this server
/// produced. Each edit is fenced to the document's current version and
/// carries its originating diagnostic.
pub fn generate_quick_fixes(
    document: &Document,
    context: &CodeActionContext,
) -> Vec<CodeActionOrCommand> {
    if !requests_quick_fix(context) {
        return Vec::new();
    }

    context
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.source.as_deref() == Some(DIAGNOSTIC_SOURCE))
        .map(|diagnostic| {
            let original = document.text_in(diagnostic.range);
            let edit = TextEdit::new(diagnostic.range, original.to_lowercase());

            CodeActionOrCommand::CodeAction(CodeAction {
                title: LOWERCASE_FIX_TITLE.to_string(),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diagnostic.clone()]),
                edit: Some(document_edit(document, vec![edit])),
                ..Default::default()
            })
        })
        .collect()
}
