//! Character-level finite-state parser for delimiter-quoted text.
//!
//! Every field must be wrapped in the configured delimiter, fields are
//! split by the separator and rows by the terminator. The machine walks
//! the input one character at a time:
//!
//! ```text
//! StartDelimiter --delimiter--> InsideDelimiter --delimiter--> EndDelimiter
//!       ^                        (other: append)                   |
//!       +---------------------- separator / terminator ------------+
//! ```
//!
//! Any other character moves the machine into the terminal `Error` state,
//! which carries the positional error. There is no escaping: a delimiter
//! inside a field always closes it.

use crate::config::ConfigParameters;
use crate::models::{Dataset, Row};
use std::borrow::Cow;
use thiserror::Error;
use tracing::{debug, warn};

/// Rejection of malformed input. Positions are zero-based character
/// offsets into the input after `\r\n` has been collapsed to `\n`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("expected delimiter at position {position}, found '{found}' instead.")]
    ExpectedDelimiter { position: usize, found: char },

    #[error("expected separator or terminator at position {position}, found '{found}' instead.")]
    ExpectedSeparatorOrTerminator { position: usize, found: char },

    #[error("unexpected state at position {position}.")]
    UnexpectedState { position: usize },

    #[error("unexpected end of file.")]
    UnexpectedEndOfFile,
}

impl SyntaxError {
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::ExpectedDelimiter { position, .. }
            | Self::ExpectedSeparatorOrTerminator { position, .. }
            | Self::UnexpectedState { position } => Some(*position),
            Self::UnexpectedEndOfFile => None,
        }
    }
}

/// Parser automaton states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    /// Expecting the opening delimiter of a field
    StartDelimiter,
    /// Accumulating field characters
    InsideDelimiter,
    /// Field just closed, expecting separator or terminator
    EndDelimiter,
    /// Terminal; the machine rejects any further input
    Error(SyntaxError),
}

/// Incremental driver for the automaton over one in-memory input
#[derive(Debug)]
pub struct DelimitedParser<'c> {
    config: &'c ConfigParameters,
    state: ParserState,
    position: usize,
    field: String,
    row: Vec<String>,
    awaiting_header: bool,
    dataset: Dataset,
}

impl<'c> DelimitedParser<'c> {
    pub fn new(config: &'c ConfigParameters) -> Self {
        Self {
            config,
            state: ParserState::StartDelimiter,
            position: 0,
            field: String::new(),
            row: Vec::new(),
            awaiting_header: config.has_headers,
            dataset: Dataset::new(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Number of characters consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Feed one character. Returns the error payload once the machine has
    /// entered the `Error` state.
    pub fn step(&mut self, ch: char) -> Result<(), SyntaxError> {
        let position = self.position;
        self.position += 1;

        let next = match self.state {
            ParserState::StartDelimiter if ch == self.config.delimiter => {
                ParserState::InsideDelimiter
            }
            ParserState::StartDelimiter => ParserState::Error(SyntaxError::ExpectedDelimiter {
                position,
                found: ch,
            }),
            ParserState::InsideDelimiter if ch == self.config.delimiter => {
                ParserState::EndDelimiter
            }
            ParserState::InsideDelimiter => {
                self.field.push(ch);
                ParserState::InsideDelimiter
            }
            ParserState::EndDelimiter if ch == self.config.separator => {
                self.close_field();
                ParserState::StartDelimiter
            }
            ParserState::EndDelimiter if ch == self.config.terminator => {
                self.close_field();
                self.close_row();
                ParserState::StartDelimiter
            }
            ParserState::EndDelimiter => {
                ParserState::Error(SyntaxError::ExpectedSeparatorOrTerminator {
                    position,
                    found: ch,
                })
            }
            ParserState::Error(_) => ParserState::Error(SyntaxError::UnexpectedState { position }),
        };

        self.state = next;
        match &self.state {
            ParserState::Error(error) => Err(error.clone()),
            _ => Ok(()),
        }
    }

    /// Resolve end of input and hand back the dataset.
    ///
    /// A closed field at end of input is flushed as the last row, so a
    /// missing final terminator is tolerated. Ending in `StartDelimiter` is
    /// a clean end; fields pending after a trailing separator are dropped.
    /// Ending inside a field is an unexpected end of file.
    pub fn finish(mut self) -> Result<Dataset, SyntaxError> {
        let state = std::mem::replace(&mut self.state, ParserState::StartDelimiter);
        match state {
            ParserState::EndDelimiter => {
                self.close_field();
                self.close_row();
            }
            ParserState::StartDelimiter => {
                if !self.row.is_empty() {
                    warn!(
                        "Dropping {} fields of an incomplete row at end of input",
                        self.row.len()
                    );
                }
            }
            ParserState::InsideDelimiter => return Err(SyntaxError::UnexpectedEndOfFile),
            ParserState::Error(error) => return Err(error),
        }
        Ok(self.dataset)
    }

    fn close_field(&mut self) {
        self.row.push(std::mem::take(&mut self.field));
    }

    fn close_row(&mut self) {
        let row = Row::new(std::mem::take(&mut self.row));
        if self.awaiting_header {
            self.awaiting_header = false;
            debug!("Discarding header row with {} fields", row.len());
            self.dataset.set_header(row);
        } else {
            self.dataset.push(row);
        }
    }
}

/// Collapse every `\r\n` pair to `\n`
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Parse a whole input into a dataset, rejecting it on the first syntax error
pub fn parse(text: &str, config: &ConfigParameters) -> Result<Dataset, SyntaxError> {
    let normalized = normalize_line_endings(text);
    let mut parser = DelimitedParser::new(config);

    for ch in normalized.chars() {
        parser.step(ch)?;
    }

    let scanned = parser.position();
    let dataset = parser.finish()?;
    debug!(
        "Scanned {} characters into {} data rows (header discarded: {})",
        scanned,
        dataset.len(),
        dataset.header().is_some()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(dataset: &Dataset) -> Vec<Vec<&str>> {
        dataset
            .iter()
            .map(|row| row.fields().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_single_row() {
        let config = ConfigParameters::default();
        let dataset = parse("\"John\",\"30\",\"Engineer\",\"Male\"\n", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["John", "30", "Engineer", "Male"]]);
        assert!(dataset.header().is_none());
    }

    #[test]
    fn test_header_row_discarded() {
        let config = ConfigParameters::default().with_headers(true);
        let input = "\"Name\",\"Age\",\"Profession\",\"Gender\"\n\"Sam\",\"25\",\"Doctor\",\"Male\"\n";
        let dataset = parse(input, &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["Sam", "25", "Doctor", "Male"]]);
        assert_eq!(dataset.header().map(Row::len), Some(4));
    }

    #[test]
    fn test_only_first_row_is_header() {
        let config = ConfigParameters::default().with_headers(true);
        let dataset = parse("\"h\"\n\"a\"\n\"b\"\n", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_missing_final_terminator_flushes_row() {
        let config = ConfigParameters::default();
        let dataset = parse("\"a\",\"b\"\n\"c\",\"d\"", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_unterminated_header_only_input_is_empty() {
        let config = ConfigParameters::default().with_headers(true);
        let dataset = parse("\"Name\",\"Age\"", &config).unwrap();

        assert!(dataset.is_empty());
        assert!(dataset.header().is_some());
    }

    #[test]
    fn test_crlf_is_normalized() {
        let config = ConfigParameters::default();
        let dataset = parse("\"a\",\"b\"\r\n\"c\",\"d\"\r\n", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_empty_input_and_empty_fields() {
        let config = ConfigParameters::default();
        assert!(parse("", &config).unwrap().is_empty());

        let dataset = parse("\"\",\"x\"\n", &config).unwrap();
        assert_eq!(fields(&dataset), vec![vec!["", "x"]]);
    }

    #[test]
    fn test_field_content_kept_verbatim() {
        let config = ConfigParameters::default();
        let dataset = parse("\"a, b;c|d 'e'\"\n", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["a, b;c|d 'e'"]]);
    }

    #[test]
    fn test_alternative_punctuation() {
        let config = ConfigParameters::default()
            .with_delimiter('\'')
            .with_separator(';');
        let dataset = parse("'x\"y';'2'\n", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["x\"y", "2"]]);
    }

    #[test]
    fn test_missing_opening_delimiter() {
        let config = ConfigParameters::default();
        let error = parse("X,\"Y\"\n", &config).unwrap_err();

        assert_eq!(
            error,
            SyntaxError::ExpectedDelimiter {
                position: 0,
                found: 'X'
            }
        );
        assert_eq!(
            error.to_string(),
            "expected delimiter at position 0, found 'X' instead."
        );
    }

    #[test]
    fn test_delimiter_inside_field_closes_it() {
        let config = ConfigParameters::default();
        let error = parse("\"a\"b\"\n", &config).unwrap_err();

        assert_eq!(
            error.to_string(),
            "expected separator or terminator at position 3, found 'b' instead."
        );
    }

    #[test]
    fn test_blank_line_is_rejected() {
        let config = ConfigParameters::default();
        let error = parse("\"a\"\n\n\"b\"\n", &config).unwrap_err();

        assert_eq!(
            error,
            SyntaxError::ExpectedDelimiter {
                position: 4,
                found: '\n'
            }
        );
    }

    #[test]
    fn test_positions_count_after_normalization() {
        let config = ConfigParameters::default();
        let error = parse("\"a\"\r\n!", &config).unwrap_err();

        assert_eq!(error.position(), Some(4));
    }

    #[test]
    fn test_end_of_file_inside_field() {
        let config = ConfigParameters::default();
        let error = parse("\"a\",\"unfinished", &config).unwrap_err();

        assert_eq!(error, SyntaxError::UnexpectedEndOfFile);
        assert_eq!(error.to_string(), "unexpected end of file.");
    }

    #[test]
    fn test_end_of_file_after_separator_drops_pending_fields() {
        let config = ConfigParameters::default();
        let dataset = parse("\"a\",\"b\"\n\"c\",", &config).unwrap();

        assert_eq!(fields(&dataset), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_step_after_error_reports_unexpected_state() {
        let config = ConfigParameters::default();
        let mut parser = DelimitedParser::new(&config);

        assert!(parser.step('x').is_err());
        assert!(matches!(parser.state(), ParserState::Error(_)));
        assert_eq!(
            parser.step('"'),
            Err(SyntaxError::UnexpectedState { position: 1 })
        );
        assert_eq!(
            parser.finish().unwrap_err().to_string(),
            "unexpected state at position 1."
        );
    }

    #[test]
    fn test_state_transitions() {
        let config = ConfigParameters::default();
        let mut parser = DelimitedParser::new(&config);
        assert_eq!(parser.state(), &ParserState::StartDelimiter);

        parser.step('"').unwrap();
        assert_eq!(parser.state(), &ParserState::InsideDelimiter);
        parser.step('v').unwrap();
        assert_eq!(parser.state(), &ParserState::InsideDelimiter);
        parser.step('"').unwrap();
        assert_eq!(parser.state(), &ParserState::EndDelimiter);
        parser.step(',').unwrap();
        assert_eq!(parser.state(), &ParserState::StartDelimiter);
        assert_eq!(parser.position(), 4);
    }
}
