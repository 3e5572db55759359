//! Where settings come from

use async_trait::async_trait;
use tower_lsp::Client;
use tower_lsp::lsp_types::{ConfigurationItem, Url};

use crate::config::SETTINGS_SECTION;
use crate::settings::error::SettingsError;
use crate::settings::types::Settings;

/// Resolves scoped settings for a document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn fetch(&self, uri: &Url) -> Result<Settings, SettingsError>;
}

/// Fetches settings from the editor with `workspace/configuration`
pub struct ClientSettingsSource {
    client: Client,
}

impl ClientSettingsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SettingsSource for ClientSettingsSource {
    async fn fetch(&self, uri: &Url) -> Result<Settings, SettingsError> {
        let items = vec![ConfigurationItem {
            scope_uri: Some(uri.clone()),
            section: Some(SETTINGS_SECTION.to_string()),
        }];

        let values = self
            .client
            .configuration(items)
            .await
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;

        let value = values
            .into_iter()
            .next()
            .ok_or(SettingsError::EmptyResponse)?;

        Settings::from_value(value)
    }
}
