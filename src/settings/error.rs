use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration request failed: {0}")]
    Unavailable(String),

    #[error("Client returned no configuration item")]
    EmptyResponse,

    #[error("Malformed settings: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("maxNumberOfProblems must be positive")]
    NonPositiveLimit,
}
