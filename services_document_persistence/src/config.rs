//! Persistence configuration
//!
//! Loaded from JSON with serde; every field has a default so partial
//! documents are fine.

use serde::{Deserialize, Serialize};
use services_file_access::FileTypeFilter;
use thiserror::Error;

/// Advisory shown when the host has no usable file-access capability
pub const DEFAULT_UNSUPPORTED_ADVISORY: &str =
    "This host does not support file system access, or the capability has not been enabled.";

/// What the status line shows when a dialog is dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationFeedback {
    /// Clear the status line
    Silent,
    /// Report a `UserCancelled` line until the next flow
    Transient,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported configuration version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Document persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Format version
    pub version: u32,
    /// File types offered by open and save dialogs
    pub accepted_types: Vec<FileTypeFilter>,
    /// Ask the open dialog for multi-select; only the first file is used
    pub allow_multiple_selection: bool,
    pub cancellation: CancellationFeedback,
    pub unsupported_advisory: String,
}

impl PersistenceConfig {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            accepted_types: vec![FileTypeFilter::plain_text()],
            allow_multiple_selection: false,
            cancellation: CancellationFeedback::Silent,
            unsupported_advisory: DEFAULT_UNSUPPORTED_ADVISORY.to_string(),
        }
    }

    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.accepted_types.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one accepted file type is required".to_string(),
            ));
        }
        for filter in &self.accepted_types {
            if filter.mime_type.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "file type '{}' has no MIME type",
                    filter.description
                )));
            }
            if filter.extensions.iter().all(|ext| ext.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "file type '{}' has no extensions",
                    filter.description
                )));
            }
        }
        Ok(())
    }

    pub fn with_accepted_types(mut self, types: Vec<FileTypeFilter>) -> Self {
        self.accepted_types = types;
        self
    }

    pub fn with_multiple_selection(mut self, allow: bool) -> Self {
        self.allow_multiple_selection = allow;
        self
    }

    pub fn with_cancellation(mut self, feedback: CancellationFeedback) -> Self {
        self.cancellation = feedback;
        self
    }

    pub fn with_unsupported_advisory(mut self, advisory: impl Into<String>) -> Self {
        self.unsupported_advisory = advisory.into();
        self
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self::new()
    }
}
