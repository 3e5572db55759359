use thiserror::Error;
use tower_lsp::lsp_types::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Document already open: {0}")]
    AlreadyOpen(Url),

    #[error("Document not found: {0}")]
    NotFound(Url),

    #[error("Stale version {received} for {uri} (current {current})")]
    StaleVersion {
        uri: Url,
        current: i32,
        received: i32,
    },
}
