//! Delimited Validator Library
//!
//! Reads delimiter-quoted text according to a configurable grammar and
//! validates the resulting rows against a fixed four-column schema
//! (name, age, profession, gender).
//!
//! This library provides tools for:
//! - Checking a decoded configuration for the four required parameters
//! - Parsing text with a character-level finite-state machine that reports
//!   the exact position of the first syntax error
//! - Validating every row and collecting all rule violations in one report
//! - Re-serializing a dataset as a table, JSON or delimited text

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod validator;

// Re-export commonly used types
pub use config::{ConfigError, ConfigParameters, RawConfig, decode_config, validate_config};
pub use error::{Result, ValidatorError};
pub use models::{Dataset, PersonRecord, Row};
pub use parser::{ParserState, SyntaxError, parse};
pub use pipeline::{PipelineOutput, PipelineStats, process_files, run_pipeline};
pub use validator::{ValidationError, ValidationReport, validate};
