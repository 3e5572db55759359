//! Static completion list
//!
//! Items carry a numeric `data` tag so that `completionItem/resolve` can
//! recover which entry the client picked.

use serde_json::{Value, json};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEntry {
    TypeScript,
    JavaScript,
}

impl CompletionEntry {
    pub const ALL: [CompletionEntry; 2] =
        [CompletionEntry::TypeScript, CompletionEntry::JavaScript];

    fn tag(self) -> u64 {
        match self {
            CompletionEntry::TypeScript => 1,
            CompletionEntry::JavaScript => 2,
        }
    }

    pub fn from_data(data: &Value) -> Option<Self> {
        match data.as_u64()? {
            1 => Some(CompletionEntry::TypeScript),
            2 => Some(CompletionEntry::JavaScript),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CompletionEntry::TypeScript => "TypeScript",
            CompletionEntry::JavaScript => "JavaScript",
        }
    }

    fn item(self) -> CompletionItem {
        CompletionItem {
            label: self.label().to_string(),
            kind: Some(CompletionItemKind::TEXT),
            data: Some(json!(self.tag())),
            ..Default::default()
        }
    }

    fn resolve(self, mut item: CompletionItem) -> CompletionItem {
        item.detail = Some(format!("{} details", self.label()));
        item.documentation = Some(Documentation::String(format!(
            "{} documentation",
            self.label()
        )));
        item
    }
}

pub fn completion_items() -> Vec<CompletionItem> {
    CompletionEntry::ALL.into_iter().map(CompletionEntry::item).collect()
}

/// Fills in detail and documentation. Items this server did not produce are
/// returned unchanged.
pub fn resolve_completion(item: CompletionItem) -> CompletionItem {
    match item.data.as_ref().and_then(CompletionEntry::from_data) {
        Some(entry) => entry.resolve(item),
        None => item,
    }
}
