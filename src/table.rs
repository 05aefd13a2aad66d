//! Table module for wildlens
//!
//! This module provides the typed, in-memory table used by the aggregation and
//! visualization engines. It handles:
//!
//! - Dynamic type inference for cells read from the CSV file
//! - In-memory storage with a column-name map
//! - Row filtering and ordered group-by over arbitrary keys
//!
//! The table is loaded once at startup and never modified afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{WildlensError, WildlensResult};
use crate::schema::Column;

/// Represents a value in a table cell
///
/// Numeric types compare with each other (Integer <-> Float) so that a column
/// mixing `5` and `5.0` behaves as one numeric series.
#[derive(Debug, Clone)]
pub enum Value {
    /// Represents an empty cell
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value (true/false)
    Boolean(bool),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) => *a as f64 == *b,
            (Value::Float(a), Value::Integer(b)) => *a == *b as f64,
            _ => false,
        }
    }
}

impl Value {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Whether the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Case-insensitive, whitespace-trimmed comparison against user text
    pub fn matches_text(&self, wanted: &str) -> bool {
        if self.is_null() {
            return false;
        }
        self.to_string().trim().to_lowercase() == wanted.trim().to_lowercase()
    }

    /// Whether the value marks a yes/true flag
    ///
    /// Accepts a boolean `true` as well as the text `yes` in any case, which
    /// is how the dataset encodes `IsEndangeredSpecies`.
    pub fn is_affirmative(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::String(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(float) => write!(f, "{}", float),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Implementation of string conversion to Value with automatic type inference
///
/// The string is tried, in order, as:
/// 1. An integer (i64)
/// 2. A floating point number (f64)
/// 3. A boolean, only for the literals `true` and `false` in any case
/// 4. Empty strings become NULL
/// 5. Anything else is kept as a string
///
/// Surrounding whitespace is ignored for the numeric and boolean checks.
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();

        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }

        if let Ok(fl) = trimmed.parse::<f64>() {
            return Value::Float(fl);
        }

        match trimmed.to_lowercase().as_str() {
            "true" => return Value::Boolean(true),
            "false" => return Value::Boolean(false),
            "" => return Value::Null,
            _ => {}
        }

        Value::String(s.to_string())
    }
}

/// Represents a row in a table
pub type Row = Vec<Value>;

/// Represents an in-memory table
#[derive(Debug, Clone)]
pub struct Table {
    /// Column names
    columns: Vec<String>,

    /// Map of column names to their indices
    column_map: HashMap<String, usize>,

    /// Rows of data
    rows: Vec<Row>,
}

impl Table {
    /// Create a new, empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        let column_map = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Table {
            columns,
            column_map,
            rows: Vec::new(),
        }
    }

    /// Get the columns of the table
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the column count
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the rows of the table
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the row count
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add a row to the table
    ///
    /// Rows shorter than the header are padded with NULL. A row with more
    /// fields than the header is rejected.
    ///
    /// # Arguments
    /// * `row` - Vector of values to add as a new row
    pub fn add_row(&mut self, mut row: Row) -> WildlensResult<()> {
        if row.len() > self.columns.len() {
            return Err(WildlensError::RowTooWide {
                row: self.rows.len() + 1,
                found: row.len(),
                expected: self.columns.len(),
            });
        }

        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
        Ok(())
    }

    /// Get the index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_map.get(name).copied()
    }

    /// Get the index of a known dataset column, failing if it is absent
    pub fn require(&self, column: Column) -> WildlensResult<usize> {
        self.column_index(column.name())
            .ok_or_else(|| WildlensError::ColumnNotFound(column.name().to_string()))
    }

    /// Create a new table with the subset of rows matching a predicate
    ///
    /// Row order is preserved.
    pub fn select<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Row) -> bool,
    {
        let mut result = Table::new(self.columns.clone());

        for row in &self.rows {
            if predicate(row) {
                result.rows.push(row.clone());
            }
        }

        result
    }

    /// Group rows by a key, ordered by the key
    ///
    /// Rows for which `key` returns `None` are left out of every group, the
    /// same way an empty grouping cell would be. Within a group, rows keep
    /// their table order.
    pub fn group_by<K, F>(&self, key: F) -> BTreeMap<K, Vec<&Row>>
    where
        K: Ord,
        F: Fn(&Row) -> Option<K>,
    {
        let mut groups: BTreeMap<K, Vec<&Row>> = BTreeMap::new();
        for row in &self.rows {
            if let Some(k) = key(row) {
                groups.entry(k).or_default().push(row);
            }
        }
        groups
    }

    /// All values of one column, in row order
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[idx])
    }
}

/// Grouping key for a categorical cell: its text, or `None` when empty
pub fn text_key(value: &Value) -> Option<String> {
    if value.is_null() {
        None
    } else {
        Some(value.to_string())
    }
}
