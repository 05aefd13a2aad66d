//! Plain-text table rendering
//!
//! Query results are printed as bordered grids:
//!
//! ```text
//! +----------+-------+
//! | City     | Total |
//! +==========+=======+
//! | Lakeside |    12 |
//! |----------+-------|
//! | Hill     |     3 |
//! +----------+-------+
//! ```
//!
//! Columns whose cells are all numeric are right-aligned.

use comfy_table::presets::ASCII_FULL;
use comfy_table::{CellAlignment, Table};

/// Format a number rounded to two decimals without trailing zeros
pub fn decimal(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    format!("{}", (value * 100.0).round() / 100.0)
}

fn is_numeric(cell: &str) -> bool {
    cell.trim().parse::<f64>().is_ok()
}

/// Build a bordered grid of `rows` under `headers`
///
/// Rows shorter than the header are padded with empty cells.
pub fn grid<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> Table {
    let header: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
    let width = header.len();

    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(header);

    for row in rows {
        let mut cells: Vec<&str> = row.iter().take(width).map(String::as_str).collect();
        cells.resize(width, "");
        table.add_row(cells);
    }

    for i in 0..width {
        let numeric = !rows.is_empty()
            && rows
                .iter()
                .all(|row| row.get(i).map(|c| is_numeric(c)).unwrap_or(false));
        if numeric {
            if let Some(column) = table.column_mut(i) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }
    }

    table
}
