//! Processing pipeline: configuration gate, parser, validator.
//!
//! Configuration and syntax errors stop the pipeline at the first
//! failure. Validation runs over the whole dataset and fails with the
//! complete batch of violations.

use crate::config::{ConfigParameters, load_config};
use crate::error::{Result, ValidatorError};
use crate::models::Dataset;
use crate::parser::parse;
use crate::validator::{ValidationReport, validate};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters collected over one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Characters scanned by the parser after line-ending normalization
    pub characters_scanned: usize,
    /// Data rows produced (header excluded)
    pub rows_parsed: usize,
    /// Whether a header row was discarded
    pub header_discarded: bool,
    /// 1-based numbers of rows without exactly four fields
    pub irregular_rows: Vec<usize>,
    /// Rule violations found by the validator
    pub violations: usize,
    /// Total processing time
    pub processing_time: Duration,
}

/// A dataset that passed every stage
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub config: ConfigParameters,
    pub dataset: Dataset,
    pub stats: PipelineStats,
}

/// Parse and validate in-memory text with an already checked configuration
pub fn run_pipeline(text: &str, config: &ConfigParameters) -> Result<PipelineOutput> {
    let start_time = Instant::now();

    let dataset = parse(text, config)?;
    let mut stats = PipelineStats {
        characters_scanned: text.chars().count() - text.matches("\r\n").count(),
        rows_parsed: dataset.len(),
        header_discarded: dataset.header().is_some(),
        irregular_rows: dataset.irregular_rows(),
        ..PipelineStats::default()
    };
    info!(
        "Parsed {} data rows from {} characters",
        stats.rows_parsed, stats.characters_scanned
    );

    if !stats.irregular_rows.is_empty() {
        warn!(
            "{} rows do not have the expected four fields: {:?}",
            stats.irregular_rows.len(),
            stats.irregular_rows
        );
    }

    let outcome = validate(&dataset);
    stats.violations = outcome.as_ref().map_or_else(ValidationReport::len, |_| 0);
    stats.processing_time = start_time.elapsed();
    info!(
        "Pipeline finished: {} rows, {} violations in {:?}",
        stats.rows_parsed, stats.violations, stats.processing_time
    );
    outcome?;

    Ok(PipelineOutput {
        config: *config,
        dataset,
        stats,
    })
}

/// Load the configuration file, read the data file and run the pipeline
pub fn process_files(data_path: &Path, config_path: &Path) -> Result<PipelineOutput> {
    info!("Loading configuration from {}", config_path.display());
    let config = load_config(config_path)?;

    info!("Reading data file {}", data_path.display());
    let text = std::fs::read_to_string(data_path).map_err(|e| {
        ValidatorError::io(format!("Failed to read data file {}", data_path.display()), e)
    })?;

    run_pipeline(&text, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_produces_output() {
        let config = ConfigParameters::default();
        let output = run_pipeline("\"John\",\"30\",\"Engineer\",\"Male\"\r\n", &config).unwrap();

        assert_eq!(output.dataset.len(), 1);
        assert_eq!(output.stats.rows_parsed, 1);
        assert_eq!(output.stats.characters_scanned, 30);
        assert!(!output.stats.header_discarded);
        assert!(output.stats.irregular_rows.is_empty());
        assert_eq!(output.stats.violations, 0);
    }

    #[test]
    fn test_syntax_error_stops_before_validation() {
        let config = ConfigParameters::default();
        let error = run_pipeline("X,\"Y\"\n", &config).unwrap_err();

        assert!(matches!(error, ValidatorError::Syntax(_)));
    }

    #[test]
    fn test_validation_errors_are_batched() {
        let config = ConfigParameters::default();
        let input = "\"Ann99\",\"40\",\"Teacher\",\"Female\"\n\"Bob\",\"17\",\"Artist\",\"Male\"\n";

        match run_pipeline(input, &config) {
            Err(ValidatorError::Validation(report)) => {
                assert_eq!(report.len(), 2);
                assert_eq!(report.errors()[0].row, 1);
                assert_eq!(report.errors()[1].row, 2);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{"delimiter":"\"","separator":",","terminator":"\n","hasHeaders":false}"#,
        )
        .unwrap();

        let error = process_files(&dir.path().join("missing.csv"), &config_path).unwrap_err();
        assert!(matches!(error, ValidatorError::Io { .. }));
    }
}
