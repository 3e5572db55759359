use thiserror::Error;

use crate::document::DocumentError;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("workspace/applyEdit request failed: {0}")]
    Request(String),

    #[error("Client rejected edit: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid command arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Edit(#[from] EditError),
}
