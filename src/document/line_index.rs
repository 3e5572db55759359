//! Line-start index with UTF-16 position conversion
//!
//! Offsets are byte offsets into UTF-8 text. Positions follow the LSP
//! convention: zero-based lines and `character` counted in UTF-16 code units.

use tower_lsp::lsp_types::Position;

/// Byte offsets of the first character of every line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(line_breaks(text, 0));
        Self { line_starts }
    }

    /// Number of lines, counting the (possibly empty) line after a trailing break
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset into a protocol position.
    ///
    /// Offsets past the end clamp to the end of the text, and offsets inside a
    /// multi-byte character resolve to the start of that character.
    pub fn position_at(&self, text: &str, offset: usize) -> Position {
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let character = text[line_start..offset].encode_utf16().count();

        Position::new(line as u32, character as u32)
    }

    /// Converts a protocol position into a byte offset.
    ///
    /// Characters past the end of a line clamp to the line end (before the
    /// line break); lines past the end clamp to the end of the text.
    pub fn offset_at(&self, text: &str, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&line_start) = self.line_starts.get(line) else {
            return text.len();
        };
        let line_end = self.line_content_end(text, line);

        let mut units = 0u32;
        for (index, ch) in text[line_start..line_end].char_indices() {
            let width = ch.len_utf16() as u32;
            if position.character < units + width {
                return line_start + index;
            }
            units += width;
        }
        line_end
    }

    /// Updates the index after `old[start..end]` was replaced by `inserted`.
    ///
    /// `text` is the text after the replacement. Line starts inside the
    /// replaced span are dropped, breaks in `inserted` are added, and later
    /// starts shift by the length difference. Edits that touch a `\r`/`\n`
    /// pair fall back to a full rebuild.
    pub fn apply_edit(&mut self, text: &str, start: usize, end: usize, inserted: &str) {
        let bytes = text.as_bytes();
        let inserted_end = start + inserted.len();
        let touches_crlf = (start > 0 && bytes[start - 1] == b'\r')
            || bytes.get(inserted_end) == Some(&b'\n');
        if touches_crlf {
            *self = Self::new(text);
            return;
        }

        let first = self.line_starts.partition_point(|&s| s <= start);
        let last = self.line_starts.partition_point(|&s| s <= end);
        let added: Vec<usize> = line_breaks(inserted, start).collect();
        let added_len = added.len();
        self.line_starts.splice(first..last, added);

        let removed = end - start;
        for line_start in &mut self.line_starts[first + added_len..] {
            *line_start = *line_start - removed + inserted.len();
        }
    }

    fn line_content_end(&self, text: &str, line: usize) -> usize {
        let line_start = self.line_starts[line];
        let bytes = text.as_bytes();
        let mut end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(text.len());

        if end > line_start && bytes[end - 1] == b'\n' {
            end -= 1;
        }
        if end > line_start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        end
    }
}

/// Offsets just past every line break in `text`, shifted by `base`.
/// `\r\n` counts as a single break.
fn line_breaks(text: &str, base: usize) -> impl Iterator<Item = usize> + '_ {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter_map(move |(i, &byte)| match byte {
            b'\n' => Some(base + i + 1),
            b'\r' if bytes.get(i + 1) != Some(&b'\n') => Some(base + i + 1),
            _ => None,
        })
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
