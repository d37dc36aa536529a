//! Core data structures for parsed input.
//!
//! A [`Row`] is the raw ordered list of field values the parser produced.
//! Validation looks at a row through [`PersonRecord`], which maps the
//! first four positions onto named optional slots so an absent column is
//! an explicit `None` instead of an out-of-bounds access.

use crate::config::ConfigParameters;
use crate::constants::{EXPECTED_FIELD_COUNT, FIELD_NAMES, positions};
use serde_json::{Map, Value};

/// One parsed row, fields in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(String::as_str)
    }

    /// Whether the row carries exactly the expected number of columns
    pub fn has_expected_width(&self) -> bool {
        self.fields.len() == EXPECTED_FIELD_COUNT
    }

    /// View the row as a record of named optional slots
    pub fn to_record(&self) -> PersonRecord<'_> {
        PersonRecord {
            name: self.get(positions::NAME),
            age: self.get(positions::AGE),
            profession: self.get(positions::PROFESSION),
            gender: self.get(positions::GENDER),
        }
    }

    /// Serialize the row with the configured punctuation, without terminator
    pub fn to_delimited(&self, config: &ConfigParameters) -> String {
        let quote = config.delimiter.to_string();
        self.fields
            .iter()
            .map(|field| format!("{quote}{field}{quote}"))
            .collect::<Vec<_>>()
            .join(&config.separator.to_string())
    }

    fn to_json_object(&self) -> Value {
        let mut object = Map::new();
        for (position, field) in self.fields.iter().enumerate() {
            let key = FIELD_NAMES
                .get(position)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("field_{}", position + 1));
            object.insert(key, Value::String(field.clone()));
        }
        Value::Object(object)
    }
}

impl From<Vec<String>> for Row {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Fixed four-slot view of a row used by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonRecord<'a> {
    pub name: Option<&'a str>,
    pub age: Option<&'a str>,
    pub profession: Option<&'a str>,
    pub gender: Option<&'a str>,
}

/// Data rows in file order, with the discarded header kept aside
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    header: Option<Row>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset directly from data rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { header: None, rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header(&self) -> Option<&Row> {
        self.header.as_ref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub(crate) fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub(crate) fn set_header(&mut self, header: Row) {
        self.header = Some(header);
    }

    /// Data rows whose width differs from the expected column count,
    /// as 1-based row numbers
    pub fn irregular_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.has_expected_width())
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// Re-serialize header (if any) and rows, each followed by the terminator
    pub fn to_delimited(&self, config: &ConfigParameters) -> String {
        let mut output = String::new();
        for row in self.header.iter().chain(self.rows.iter()) {
            output.push_str(&row.to_delimited(config));
            output.push(config.terminator);
        }
        output
    }

    /// Render data rows as a pretty JSON array of objects keyed by column name
    pub fn to_json(&self) -> serde_json::Result<String> {
        let rows: Vec<Value> = self.rows.iter().map(Row::to_json_object).collect();
        serde_json::to_string_pretty(&rows)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
