//! wildlens library crate
//!
//! The library behind the `wildlens` binary: an interactive, menu-driven
//! analysis tool for an urban wildlife sighting dataset. It provides:
//!
//! - Validation and loading of the 23-column CSV file, once as raw text
//!   records and once as a typed table with inferred cell types
//! - Column resolution through a schema built once per header
//! - Retrieval queries that filter raw records and print grid tables
//! - Grouping and aggregation queries over the typed table (sums, means,
//!   modes, binning and Pearson correlation)
//! - Chart queries that render PNG images with plotters
//! - The menu shell that ties them together

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod csv_handler;
pub mod error;
pub mod input;
pub mod record;
pub mod render;
pub mod retrieval;
pub mod schema;
pub mod shell;
pub mod table;
pub mod visualize;
