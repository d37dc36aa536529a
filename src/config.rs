//! Configuration management and validation.
//!
//! The configuration file is a JSON object with four keys: `delimiter`,
//! `separator`, `terminator` and `hasHeaders`. It is decoded into a raw,
//! all-optional structure first and then passed through the configuration
//! gate, which reports the first missing parameter by name and rejects
//! punctuation outside the supported set.

use crate::constants::{
    ALLOWED_DELIMITERS, ALLOWED_SEPARATORS, ALLOWED_TERMINATORS, config_keys,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failures raised while loading or checking the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration parameter: {name}")]
    MissingParameter { name: &'static str },

    #[error("Invalid value {value:?} for configuration parameter {name}: expected one of {expected}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        expected: String,
    },

    #[error("Invalid configuration: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot read configuration file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a missing parameter error
    pub fn missing(name: &'static str) -> Self {
        Self::MissingParameter { name }
    }

    /// Name of the offending parameter, when the error is about one
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::MissingParameter { name } | Self::InvalidParameter { name, .. } => Some(*name),
            _ => None,
        }
    }
}

/// Configuration exactly as decoded, before the gate has checked it
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub delimiter: Option<String>,
    pub separator: Option<String>,
    pub terminator: Option<String>,
    pub has_headers: Option<bool>,
}

/// Checked grammar consumed read-only by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigParameters {
    /// Quote character wrapping every field
    pub delimiter: char,
    /// Character between fields of one row
    pub separator: char,
    /// Character between rows
    pub terminator: char,
    /// Whether the first terminated row is a header to discard
    pub has_headers: bool,
}

impl Default for ConfigParameters {
    fn default() -> Self {
        Self {
            delimiter: '"',
            separator: ',',
            terminator: '\n',
            has_headers: false,
        }
    }
}

impl ConfigParameters {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// Check a decoded configuration and build the parser grammar from it.
///
/// Presence is checked in the fixed order delimiter, hasHeaders, separator,
/// terminator, and only the first missing parameter is reported. An empty
/// string counts as missing. Values are checked once all four are present.
pub fn validate_config(raw: RawConfig) -> Result<ConfigParameters, ConfigError> {
    let delimiter = present(raw.delimiter, config_keys::DELIMITER)?;
    let has_headers = raw
        .has_headers
        .ok_or_else(|| ConfigError::missing(config_keys::HAS_HEADERS))?;
    let separator = present(raw.separator, config_keys::SEPARATOR)?;
    let terminator = present(raw.terminator, config_keys::TERMINATOR)?;

    let config = ConfigParameters {
        delimiter: single_char(&delimiter, config_keys::DELIMITER, ALLOWED_DELIMITERS)?,
        separator: single_char(&separator, config_keys::SEPARATOR, ALLOWED_SEPARATORS)?,
        terminator: single_char(&terminator, config_keys::TERMINATOR, ALLOWED_TERMINATORS)?,
        has_headers,
    };

    debug!("Configuration accepted: {:?}", config);
    Ok(config)
}

/// Decode configuration text and run it through the gate
pub fn decode_config(text: &str) -> Result<ConfigParameters, ConfigError> {
    let raw: RawConfig = serde_json::from_str(text)?;
    validate_config(raw)
}

/// Read, decode and check a configuration file
pub fn load_config(path: &Path) -> Result<ConfigParameters, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes of configuration from {}", text.len(), path.display());
    decode_config(&text)
}

fn present(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::missing(name))
}

fn single_char(value: &str, name: &'static str, allowed: &[char]) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if allowed.contains(&c) => Ok(c),
        _ => Err(ConfigError::InvalidParameter {
            name,
            value: value.to_string(),
            expected: allowed
                .iter()
                .map(|c| format!("{:?}", c))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
