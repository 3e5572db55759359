//! Versioned text document

use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

use crate::document::line_index::LineIndex;

/// An open document snapshot
///
/// `version` identifies exactly one text snapshot; it only changes through
/// [`DocumentStore::apply_changes`](crate::document::DocumentStore::apply_changes).
#[derive(Debug, Clone)]
pub struct Document {
    uri: Url,
    version: i32,
    text: String,
    line_index: LineIndex,
}

impl Document {
    pub fn new(uri: Url, text: String, version: i32) -> Self {
        let line_index = LineIndex::new(&text);
        Self {
            uri,
            version,
            text,
            line_index,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position_at(&self.text, offset)
    }

    pub fn offset_at(&self, position: Position) -> usize {
        self.line_index.offset_at(&self.text, position)
    }

    /// Returns the text covered by `range`. Reversed ranges are normalized.
    pub fn text_in(&self, range: Range) -> &str {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        &self.text[start.min(end)..start.max(end)]
    }

    /// Range spanning the whole document
    pub fn full_range(&self) -> Range {
        Range::new(Position::new(0, 0), self.position_at(self.text.len()))
    }

    /// Applies a single content change. A change without a range replaces the
    /// whole text.
    pub(crate) fn apply_change(&mut self, change: TextDocumentContentChangeEvent) {
        let Some(range) = change.range else {
            self.text = change.text;
            self.line_index = LineIndex::new(&self.text);
            return;
        };

        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        let (start, end) = (start.min(end), start.max(end));

        self.text.replace_range(start..end, &change.text);
        self.line_index
            .apply_edit(&self.text, start, end, &change.text);
    }

    pub(crate) fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}
