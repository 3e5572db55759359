//! Diagnostics generation
//!
//! Flags every word of two or more uppercase ASCII letters.

use std::sync::LazyLock;

use regex::Regex;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, Range,
};

use crate::document::Document;
use crate::settings::Settings;

/// Source tag on every diagnostic this server publishes
pub const DIAGNOSTIC_SOURCE: &str = "ex";

// ASCII word boundaries: a non-ASCII letter does not join a word, so the
// uppercase tail of `ÜBER` still matches.
static UPPERCASE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[A-Z]{2,}(?-u:\b)").expect("uppercase word pattern is valid")
});

/// Scans `document` in order and reports at most `maxNumberOfProblems`
/// matches. Scanning stops at the cap; later matches are never examined.
pub fn generate_diagnostics(
    document: &Document,
    settings: &Settings,
    related_information: bool,
) -> Vec<Diagnostic> {
    let limit = settings.max_number_of_problems as usize;

    UPPERCASE_WORD
        .find_iter(document.text())
        .take(limit)
        .map(|word| {
            let range = Range::new(
                document.position_at(word.start()),
                document.position_at(word.end()),
            );
            let related = related_information.then(|| related_information_for(document, range));

            Diagnostic {
                range,
                severity: Some(DiagnosticSeverity::WARNING),
                source: Some(DIAGNOSTIC_SOURCE.to_string()),
                message: format!("{} is all uppercase.", word.as_str()),
                related_information: related,
                ..Default::default()
            }
        })
        .collect()
}

fn related_information_for(document: &Document, range: Range) -> Vec<DiagnosticRelatedInformation> {
    ["Spelling matters", "Particularly for names"]
        .into_iter()
        .map(|message| DiagnosticRelatedInformation {
            location: Location::new(document.uri().clone(), range),
            message: message.to_string(),
        })
        .collect()
}
