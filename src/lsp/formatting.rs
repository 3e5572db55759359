use tower_lsp::lsp_types::{Position, Range, TextEdit};

use crate::document::Document;

/// Inserts a banner reporting the line count at the top of the document
pub fn format_document(document: &Document) -> Vec<TextEdit> {
    let start = Position::new(0, 0);
    vec![TextEdit::new(
        Range::new(start, start),
        format!(
            "Formatting has been executed. (lineCount: {})\n",
            document.line_count()
        ),
    )]
}
