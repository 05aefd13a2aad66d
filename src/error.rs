//! Error handling for wildlens
//!
//! This module defines the error type shared by the loaders, the query
//! engines and the chart renderer. Errors that are fatal to a session
//! (missing file, wrong column count) and errors that only abort a single
//! query (a missing column, a chart that could not be written) use the same
//! enum; the shell decides which ones end the session.
//!
//! The module uses thiserror to keep the variants and their messages together.

use std::path::PathBuf;

use thiserror::Error;

/// WildlensError represents all possible errors that can occur in wildlens
#[derive(Error, Debug)]
pub enum WildlensError {
    /// Error during file system operations (reading files, writing charts)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error while parsing delimited file data
    #[error("File parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// The input file does not exist
    #[error("File '{}' does not exist.", .0.display())]
    FileNotFound(PathBuf),

    /// The header row does not have the expected number of columns
    #[error("Expected {expected} columns, found {found} columns.")]
    SchemaMismatch {
        /// Number of columns the dataset must have
        expected: usize,
        /// Number of columns found in the header row
        found: usize,
    },

    /// The input file has no header row at all
    #[error("File '{}' is empty.", .0.display())]
    EmptyFile(PathBuf),

    /// A data row is wider than the header
    #[error("Row {row} has {found} fields, but the header has {expected}")]
    RowTooWide {
        /// 1-based data row number
        row: usize,
        /// Fields in the offending row
        found: usize,
        /// Fields in the header
        expected: usize,
    },

    /// A column needed by a query is not present in the header
    #[error("Column '{0}' not found.")]
    ColumnNotFound(String),

    /// Failure while drawing or saving a chart
    #[error("Chart error: {0}")]
    ChartError(String),
}

/// Result type alias for operations that can produce a WildlensError
pub type WildlensResult<T> = std::result::Result<T, WildlensError>;
