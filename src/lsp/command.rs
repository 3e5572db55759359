//! The `lsp-sample.reverse` command
//!
//! Arguments are `[uri, expectedVersion, selections]`. The command only runs
//! when the document is still at the version the client computed its
//! selections against; the resulting edits go out as one batch fenced to that
//! version.

use std::sync::Mutex;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_lsp::lsp_types::{ExecuteCommandParams, Range, TextEdit, Url, WorkspaceEdit};
use tracing::info;

use crate::document::{DocumentError, DocumentStore};
use crate::lsp::edit::{EditSink, document_edit};
use crate::lsp::error::CommandError;
use crate::sync::lock;

pub const REVERSE_COMMAND: &str = "lsp-sample.reverse";

/// The uri argument, either a plain string or a serialized editor `Uri`
#[derive(Deserialize)]
#[serde(untagged)]
enum UriArgument {
    Plain(Url),
    Editor { external: Url },
}

impl From<UriArgument> for Url {
    fn from(argument: UriArgument) -> Self {
        match argument {
            UriArgument::Plain(uri) | UriArgument::Editor { external: uri } => uri,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseRequest {
    pub uri: Url,
    pub version: i32,
    pub selections: Vec<Range>,
}

impl ReverseRequest {
    pub fn from_params(params: &ExecuteCommandParams) -> Result<Self, CommandError> {
        if params.command != REVERSE_COMMAND {
            return Err(CommandError::UnknownCommand(params.command.clone()));
        }
        Self::from_arguments(&params.arguments)
    }

    pub fn from_arguments(arguments: &[Value]) -> Result<Self, CommandError> {
        let [uri, version, selections, ..] = arguments else {
            return Err(CommandError::InvalidArguments(format!(
                "expected [uri, version, selections], got {} arguments",
                arguments.len()
            )));
        };

        let uri: UriArgument = parse_argument("uri", uri)?;
        let version: i32 = parse_argument("version", version)?;
        let selections: Option<Vec<Range>> = parse_argument("selections", selections)?;

        Ok(Self {
            uri: uri.into(),
            version,
            selections: selections.unwrap_or_default(),
        })
    }
}

fn parse_argument<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, CommandError> {
    serde_json::from_value(value.clone())
        .map_err(|e| CommandError::InvalidArguments(format!("{}: {}", name, e)))
}

/// Computes the reverse edit batch against the current store state.
///
/// Every selection with non-empty text is reversed in place. When no
/// selection produced an edit the whole document is reversed instead.
pub fn plan_reverse(
    store: &DocumentStore,
    request: &ReverseRequest,
) -> Result<WorkspaceEdit, CommandError> {
    let document = store.get(&request.uri)?;

    if document.version() != request.version {
        return Err(DocumentError::StaleVersion {
            uri: request.uri.clone(),
            current: document.version(),
            received: request.version,
        }
        .into());
    }

    let mut edits: Vec<TextEdit> = request
        .selections
        .iter()
        .filter_map(|selection| {
            let text = document.text_in(*selection);
            (!text.is_empty()).then(|| TextEdit::new(*selection, reverse(text)))
        })
        .collect();

    if edits.is_empty() {
        edits.push(TextEdit::new(
            document.full_range(),
            reverse(document.text()),
        ));
    }

    Ok(document_edit(document, edits))
}

/// Plans the edit under the store lock, then submits it as a single batch
pub async fn execute_reverse(
    documents: &Mutex<DocumentStore>,
    sink: &dyn EditSink,
    request: &ReverseRequest,
) -> Result<(), CommandError> {
    let edit = {
        let store = lock(documents);
        plan_reverse(&store, request)?
    };

    sink.apply(edit).await?;
    info!(
        "Reversed text in {} at version {}",
        request.uri, request.version
    );
    Ok(())
}

fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}
