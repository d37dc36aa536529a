//! Field-level validation of parsed rows.
//!
//! Each data row is checked against four independent rules (name, age,
//! profession, gender). Validation never stops early: every row is run
//! through every rule and all violations are collected into a single
//! [`ValidationReport`], ordered by row and then by rule.

use crate::constants::{GENDER_VALUES, MAX_AGE, MAX_TEXT_FIELD_LENGTH, MIN_AGE};
use crate::models::{Dataset, Row};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Semantic column a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Age,
    Profession,
    Gender,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Profession => "profession",
            Field::Gender => "gender",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was wrong with a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The row has no value at this position
    Missing,
    /// Free text longer than the allowed length
    TooLong { limit: usize },
    /// Free text containing an ASCII digit or a hyphen
    DisallowedCharacter { found: char },
    /// Age without a leading integer
    NotNumeric { value: String },
    /// Age outside the accepted bounds
    OutOfRange { value: i64 },
    /// Gender other than male or female
    InvalidGender { value: String },
}

/// One rule violation on one data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// 1-based position among data rows (header excluded)
    pub row: usize,
    pub field: Field,
    pub violation: Violation,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row, field) = (self.row, self.field);
        match &self.violation {
            Violation::Missing => write!(f, "Row {row}: {field} is missing."),
            Violation::TooLong { limit } => {
                write!(f, "Row {row}: {field} exceeds {limit} characters.")
            }
            Violation::DisallowedCharacter { .. } => {
                write!(f, "Row {row}: {field} contains numeric or hyphen characters.")
            }
            Violation::NotNumeric { value } => {
                write!(f, "Row {row}: {field} '{value}' is not a number.")
            }
            Violation::OutOfRange { value } => write!(
                f,
                "Row {row}: {field} {value} is outside the range {MIN_AGE}-{MAX_AGE}."
            ),
            Violation::InvalidGender { value } => {
                write!(f, "Row {row}: {field} '{value}' must be 'male' or 'female'.")
            }
        }
    }
}

/// Every violation found in a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// One-line message per violation, in report order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Number of distinct rows with at least one violation
    pub fn rows_affected(&self) -> usize {
        let mut rows: Vec<usize> = self.errors.iter().map(|e| e.row).collect();
        rows.dedup();
        rows.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error(s) in {} row(s)",
            self.errors.len(),
            self.rows_affected()
        )
    }
}

impl std::error::Error for ValidationReport {}

/// Validate every data row, collecting all violations
pub fn validate(dataset: &Dataset) -> Result<(), ValidationReport> {
    let errors: Vec<ValidationError> = dataset
        .iter()
        .enumerate()
        .flat_map(|(index, row)| validate_row(index + 1, row))
        .collect();

    if errors.is_empty() {
        info!("All {} data rows passed validation", dataset.len());
        Ok(())
    } else {
        let report = ValidationReport { errors };
        info!(
            "Validation found {} errors in {} of {} rows",
            report.len(),
            report.rows_affected(),
            dataset.len()
        );
        Err(report)
    }
}

/// Run all four rules on one row. `row_number` is 1-based.
pub fn validate_row(row_number: usize, row: &Row) -> Vec<ValidationError> {
    let record = row.to_record();
    let checks = [
        (Field::Name, check_text(record.name)),
        (Field::Age, check_age(record.age).into_iter().collect()),
        (Field::Profession, check_text(record.profession)),
        (Field::Gender, check_gender(record.gender).into_iter().collect()),
    ];

    let errors: Vec<ValidationError> = checks
        .into_iter()
        .flat_map(|(field, violations)| {
            violations.into_iter().map(move |violation| ValidationError {
                row: row_number,
                field,
                violation,
            })
        })
        .collect();

    if !errors.is_empty() {
        debug!("Row {} has {} violations", row_number, errors.len());
    }
    errors
}

/// Name and profession: bounded length, no digits or hyphens
fn check_text(value: Option<&str>) -> Vec<Violation> {
    let Some(value) = value else {
        return vec![Violation::Missing];
    };

    let mut violations = Vec::new();
    if value.chars().count() > MAX_TEXT_FIELD_LENGTH {
        violations.push(Violation::TooLong {
            limit: MAX_TEXT_FIELD_LENGTH,
        });
    }
    if let Some(found) = value.chars().find(|c| c.is_ascii_digit() || *c == '-') {
        violations.push(Violation::DisallowedCharacter { found });
    }
    violations
}

fn check_age(value: Option<&str>) -> Option<Violation> {
    let Some(value) = value else {
        return Some(Violation::Missing);
    };

    match parse_leading_int(value) {
        None => Some(Violation::NotNumeric {
            value: value.to_string(),
        }),
        Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => {
            Some(Violation::OutOfRange { value: age })
        }
        Some(_) => None,
    }
}

fn check_gender(value: Option<&str>) -> Option<Violation> {
    let Some(value) = value else {
        return Some(Violation::Missing);
    };

    let lowered = value.to_lowercase();
    if GENDER_VALUES.contains(&lowered.as_str()) {
        None
    } else {
        Some(Violation::InvalidGender {
            value: value.to_string(),
        })
    }
}

/// Parse the integer at the start of `value`.
///
/// Leading whitespace and one sign character are accepted, then as many
/// ASCII digits as follow; anything after them is ignored (`"30abc"` is
/// 30). Returns `None` when no digit follows. Magnitudes beyond `i64`
/// saturate.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let length = digits.bytes().take_while(u8::is_ascii_digit).count();
    if length == 0 {
        return None;
    }

    let magnitude = digits[..length].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}
