//! CSV file handling module for wildlens
//!
//! This module reads the wildlife dataset in two independent shapes:
//!
//! - a [`RecordSet`] of untyped text rows for the retrieval queries
//! - a typed [`Table`] for the aggregation and visualization queries
//!
//! Both are read from the same path with the csv crate and buffered I/O.
//! Neither is written back; the file is only ever read.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;

use crate::error::{WildlensError, WildlensResult};
use crate::record::{Record, RecordSet};
use crate::schema::{Schema, EXPECTED_COLUMN_COUNT};
use crate::table::{Table, Value};

/// Open `path` as a CSV reader that tolerates rows of varying width
fn open_reader(path: &Path) -> WildlensResult<csv::Reader<BufReader<File>>> {
    if !path.exists() {
        return Err(WildlensError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file)))
}

/// Read the header row, failing if the file has none
fn read_header(
    reader: &mut csv::Reader<BufReader<File>>,
    path: &Path,
) -> WildlensResult<Vec<String>> {
    let header = reader.headers()?;
    if header.is_empty() {
        return Err(WildlensError::EmptyFile(path.to_path_buf()));
    }
    Ok(header.iter().map(|s| s.to_string()).collect())
}

/// Check that the dataset exists and has the expected column count
///
/// Only the header row is read.
///
/// # Returns
/// * `Ok(width)` - the number of header columns, always 23
/// * `Err(FileNotFound)` if the path does not exist
/// * `Err(SchemaMismatch)` with the observed count if the width differs
pub fn validate(path: &Path) -> WildlensResult<usize> {
    let mut reader = open_reader(path)?;
    let found = read_header(&mut reader, path)?.len();

    if found != EXPECTED_COLUMN_COUNT {
        return Err(WildlensError::SchemaMismatch {
            expected: EXPECTED_COLUMN_COUNT,
            found,
        });
    }

    debug!("Validated {} ({} columns)", path.display(), found);
    Ok(found)
}

/// Load the dataset as untyped rows for the retrieval engine
///
/// The header is resolved into a [`Schema`] once here. Data rows keep the
/// number of fields they have in the file.
pub fn load_records(path: &Path) -> WildlensResult<RecordSet> {
    let mut reader = open_reader(path)?;
    let header = read_header(&mut reader, path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(Record::new(record.iter().map(|f| f.to_string()).collect()));
    }

    debug!(
        "Loaded {} records with {} columns from {}",
        records.len(),
        header.len(),
        path.display()
    );
    Ok(RecordSet::new(Schema::from_header(header), records))
}

/// Load the dataset as a typed table for the aggregation engine
///
/// Each cell is converted with `Value::from`, which infers integers, floats,
/// booleans and empty cells.
pub fn load_table(path: &Path) -> WildlensResult<Table> {
    let mut reader = open_reader(path)?;
    let header = read_header(&mut reader, path)?;

    let mut table = Table::new(header);
    for result in reader.records() {
        let record = result?;
        let row = record.iter().map(Value::from).collect();
        table.add_row(row)?;
    }

    debug!(
        "Loaded table with {} rows and {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use std::fs;
    use tempfile::TempDir;

    fn header_line() -> String {
        Column::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_accepts_full_header() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ok.csv", &format!("{}\n", header_line()));
        assert_eq!(validate(&path).unwrap(), EXPECTED_COLUMN_COUNT);
    }

    #[test]
    fn test_validate_reports_observed_count() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "narrow.csv", "City,Season,Year\nA,Spring,2020\n");
        let err = validate(&path).unwrap_err();
        assert!(matches!(
            err,
            WildlensError::SchemaMismatch { expected: 23, found: 3 }
        ));
        assert_eq!(err.to_string(), "Expected 23 columns, found 3 columns.");
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = validate(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, WildlensError::FileNotFound(_)));
    }

    #[test]
    fn test_load_records_keeps_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ragged.csv", "City,Season\nLakeside,Spring\nHillview\n");
        let set = load_records(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[1].len(), 1);
        assert_eq!(set.schema().index(Column::Season), Some(1));
    }

    #[test]
    fn test_load_table_infers_types() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "typed.csv",
            "City,NumberOfSightings,NearbyGreenSpaces\nLakeside,5,0.25\nHillview,,\n",
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][1], Value::Integer(5));
        assert_eq!(table.rows()[0][2], Value::Float(0.25));
        assert_eq!(table.rows()[1][1], Value::Null);
    }

    #[test]
    fn test_load_table_rejects_wide_row() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "wide.csv", "a,b\n1,2,3\n");
        assert!(matches!(
            load_table(&path),
            Err(WildlensError::RowTooWide { row: 1, found: 3, expected: 2 })
        ));
    }
}
