//! Error handling for parsing and validation operations.
//!
//! One error type covers the whole pipeline. Configuration and syntax
//! errors abort on the first failure; validation errors arrive as a
//! single batch report.

use crate::config::ConfigError;
use crate::constants::exit_codes;
use crate::parser::SyntaxError;
use crate::validator::ValidationReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationReport),
}

impl ValidatorError {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Process exit code for this class of failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. } => exit_codes::IO,
            Self::Configuration(_) => exit_codes::CONFIGURATION,
            Self::Syntax(_) => exit_codes::SYNTAX,
            Self::Validation(_) => exit_codes::VALIDATION,
        }
    }
}

impl From<std::io::Error> for ValidatorError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
