//! Per-document settings

use serde::Deserialize;
use serde_json::Value;

use crate::config::DEFAULT_MAX_NUMBER_OF_PROBLEMS;
use crate::settings::error::SettingsError;

/// Settings read from the `languageServerExample` configuration section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub max_number_of_problems: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_number_of_problems: DEFAULT_MAX_NUMBER_OF_PROBLEMS,
        }
    }
}

impl Settings {
    pub fn new(max_number_of_problems: u32) -> Self {
        Self {
            max_number_of_problems,
        }
    }

    /// Parses a configuration section value. Missing fields take their
    /// defaults; a `null` section is the default settings.
    pub fn from_value(value: Value) -> Result<Self, SettingsError> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_json::from_value(value)?;
        if settings.max_number_of_problems == 0 {
            return Err(SettingsError::NonPositiveLimit);
        }
        Ok(settings)
    }
}
