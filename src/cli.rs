//! Command-line interface components.
//!
//! Argument parsing, logging setup and the rendering of results. The
//! dataset goes to stdout; diagnostics and the run summary go to stderr.

use crate::constants::{FIELD_NAMES, exit_codes};
use crate::error::ValidatorError;
use crate::models::{Dataset, Row};
use crate::pipeline::{PipelineOutput, PipelineStats, process_files};
use crate::validator::{Field, ValidationReport};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "delimited-validator")]
#[command(about = "Parse a delimiter-quoted text file and validate its rows")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to the delimited data file
    #[arg(value_name = "DATA_FILE")]
    pub data_path: PathBuf,

    /// Path to the JSON configuration file (delimiter, separator, terminator, hasHeaders)
    #[arg(value_name = "CONFIG_FILE")]
    pub config_path: PathBuf,

    /// Output format for the validated dataset
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Human,
    /// JSON for scripting
    Json,
    /// Re-serialized with the configured punctuation
    Delimited,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("delimited_validator={}", log_level)));

    // Quiet mode keeps a compact layer without timestamps
    let compact = args.quiet.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
    });
    let timed = (!args.quiet).then(|| {
        fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(timed)
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run the pipeline for the given arguments and print the dataset
pub fn run(args: &Args) -> Result<()> {
    debug!("Arguments: {:?}", args);

    let output = process_files(&args.data_path, &args.config_path)
        .with_context(|| format!("Failed to process {}", args.data_path.display()))?;

    println!("{}", render_dataset(&output, args.format)?);

    if args.format == OutputFormat::Human && !args.quiet {
        eprintln!("{} {}", "✓".bright_green().bold(), summary_line(&output.stats));
    }
    Ok(())
}

/// One-line run summary for human output
pub fn summary_line(stats: &PipelineStats) -> String {
    format!(
        "{} rows validated, {} violations in {:.2}ms",
        stats.rows_parsed,
        stats.violations,
        stats.processing_time.as_secs_f64() * 1000.0
    )
}

/// Render a validated dataset in the requested format
pub fn render_dataset(output: &PipelineOutput, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Human => render_table(&output.dataset).join("\n"),
        OutputFormat::Json => output
            .dataset
            .to_json()
            .context("Failed to serialize dataset as JSON")?,
        OutputFormat::Delimited => output
            .dataset
            .to_delimited(&output.config)
            .trim_end_matches(output.config.terminator)
            .to_string(),
    })
}

/// Column-aligned table lines, heading first
pub fn render_table(dataset: &Dataset) -> Vec<String> {
    let columns = dataset
        .iter()
        .map(Row::len)
        .max()
        .unwrap_or(0)
        .max(FIELD_NAMES.len());

    let headings: Vec<String> = (0..columns)
        .map(|i| match FIELD_NAMES.get(i) {
            Some(name) => name.to_string(),
            None => format!("field_{}", i + 1),
        })
        .collect();

    let mut widths: Vec<usize> = headings.iter().map(|h| h.chars().count()).collect();
    for row in dataset {
        for (i, field) in row.fields().iter().enumerate() {
            widths[i] = widths[i].max(field.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = *width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    std::iter::once(format_line(&headings))
        .chain(dataset.iter().map(|row| format_line(row.fields())))
        .collect()
}

#[derive(Serialize)]
struct ViolationEntry {
    row: usize,
    field: Field,
    message: String,
}

/// Print a failure to stderr in the requested format
pub fn report_failure(error: &anyhow::Error, format: OutputFormat) {
    match error.downcast_ref::<ValidatorError>() {
        Some(ValidatorError::Validation(report)) => report_validation(report, format),
        _ => eprintln!("{} {:#}", "Error:".bright_red().bold(), error),
    }
}

fn report_validation(report: &ValidationReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        let entries: Vec<ViolationEntry> = report
            .errors()
            .iter()
            .map(|e| ViolationEntry {
                row: e.row,
                field: e.field,
                message: e.to_string(),
            })
            .collect();
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => eprintln!("{}", json),
            Err(e) => eprintln!("{} {}", "Error:".bright_red().bold(), e),
        }
        return;
    }

    eprintln!(
        "{} {}",
        "Validation failed:".bright_red().bold(),
        report
    );
    for message in report.messages() {
        eprintln!("  {} {}", "✗".red(), message);
    }
}

/// Exit code for an error returned by [`run`]
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<ValidatorError>()
        .map(|e| i32::from(e.exit_code()))
        .unwrap_or(1)
}

/// Exit code for a successful run
pub fn success_code() -> i32 {
    i32::from(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParameters;
    use crate::parser::parse;
    use crate::pipeline::run_pipeline;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["delimited-validator", "data.csv", "config.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_positional_arguments() {
        let args = args(&[]);
        assert_eq!(args.data_path, PathBuf::from("data.csv"));
        assert_eq!(args.config_path, PathBuf::from("config.json"));
        assert_eq!(args.format, OutputFormat::Human);
    }

    #[test]
    fn test_missing_arguments_is_usage_error() {
        let error = Args::try_parse_from(["delimited-validator", "data.csv"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert_eq!(error.exit_code(), i32::from(exit_codes::USAGE));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(args(&[]).get_log_level(), "warn");
        assert_eq!(args(&["-v"]).get_log_level(), "info");
        assert_eq!(args(&["-vv"]).get_log_level(), "debug");
        assert_eq!(args(&["-vvvv"]).get_log_level(), "trace");
        assert_eq!(args(&["--quiet"]).get_log_level(), "error");
    }

    #[test]
    fn test_format_option() {
        assert_eq!(args(&["--format", "json"]).format, OutputFormat::Json);
        assert_eq!(args(&["-f", "delimited"]).format, OutputFormat::Delimited);
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let dataset = parse(
            "\"Sam\",\"25\",\"Doctor\",\"Male\"\n\"Josephine\",\"40\",\"Pilot\",\"Female\"\n",
            &ConfigParameters::default(),
        )
        .unwrap();

        let lines = render_table(&dataset);
        assert_eq!(lines[0], "name       age  profession  gender");
        assert_eq!(lines[1], "Sam        25   Doctor      Male");
        assert_eq!(lines[2], "Josephine  40   Pilot       Female");
    }

    #[test]
    fn test_render_delimited_round_trips() {
        let config = ConfigParameters::default().with_separator(';').with_headers(true);
        let input = "\"Name\";\"Age\";\"Profession\";\"Gender\"\n\"Sam\";\"25\";\"Doctor\";\"Male\"\n";
        let output = run_pipeline(input, &config).unwrap();

        let rendered = render_dataset(&output, OutputFormat::Delimited).unwrap();
        assert_eq!(format!("{}\n", rendered), input);
    }

    #[test]
    fn test_exit_code_from_wrapped_error() {
        let config = ConfigParameters::default();
        let error = run_pipeline("\"Bob\",\"17\",\"Artist\",\"Male\"\n", &config).unwrap_err();
        let wrapped = anyhow::Error::new(error).context("Failed to process data.csv");

        assert_eq!(exit_code(&wrapped), i32::from(exit_codes::VALIDATION));
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
        assert_eq!(success_code(), 0);
    }

    #[test]
    fn test_summary_line_reports_violations() {
        let output = run_pipeline(
            "\"Sam\",\"25\",\"Doctor\",\"Male\"\n",
            &ConfigParameters::default(),
        )
        .unwrap();

        let summary = summary_line(&output.stats);
        assert!(summary.starts_with("1 rows validated, 0 violations in "));
    }
}
