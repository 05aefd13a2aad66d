//! Raw, untyped records for the row-based retrieval path
//!
//! A [`Record`] keeps every field as the text found in the file. Numbers are
//! parsed only when a query compares them, so one malformed cell costs that
//! query a row instead of failing the load.

use crate::schema::{Column, Schema};

/// Marker shown in place of a field whose column is missing
pub const UNAVAILABLE: &str = "N/A";

/// One data row, aligned positionally to the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Wrap the fields of one data row
    pub fn new(fields: Vec<String>) -> Self {
        Record { fields }
    }

    /// Number of fields in this row, which may differ from the header width
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `idx`, or `None` if the row is too short
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }

    /// Field at `idx`, trimmed and parsed as a number
    pub fn number(&self, idx: usize) -> Option<f64> {
        self.get(idx)?.trim().parse::<f64>().ok()
    }

    /// Case-insensitive, whitespace-trimmed text match of the field at `idx`
    pub fn text_matches(&self, idx: usize, wanted: &str) -> bool {
        self.get(idx)
            .map(|field| field.trim().to_lowercase() == wanted.trim().to_lowercase())
            .unwrap_or(false)
    }
}

/// The header schema together with every data row of the file
#[derive(Debug, Clone)]
pub struct RecordSet {
    schema: Schema,
    records: Vec<Record>,
}

impl RecordSet {
    /// Bundle a resolved schema with its rows
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        RecordSet { schema, records }
    }

    /// The schema resolved from the header
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All data rows in file order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the file had no data rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Project `column` out of `record`, substituting the unavailable marker
    /// when the header lacks the column or the row is too short
    pub fn project(&self, record: &Record, column: Column) -> String {
        self.schema
            .index(column)
            .and_then(|idx| record.get(idx))
            .unwrap_or(UNAVAILABLE)
            .to_string()
    }
}
