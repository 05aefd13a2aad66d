//! Configuration module for wildlens
//!
//! This module provides a centralized configuration structure for the application.
//! The data file path chosen at startup is stored here and handed to both the
//! row-based and the tabular loader, instead of being cached in global state.

use std::path::{Path, PathBuf};

/// Default data file offered when the user does not name one
pub const DEFAULT_DATA_FILE: &str = "Urban_wildlife.csv";

/// Application configuration
///
/// Created once at startup and passed by reference to the components that
/// need it. Nothing in it changes after the session starts.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whether to show verbose output
    verbose: bool,

    /// Path of the dataset shared by both loaders
    data_path: PathBuf,

    /// Directory that chart images are written into
    chart_dir: PathBuf,
}

impl AppConfig {
    /// Create a new application configuration
    ///
    /// # Arguments
    /// * `verbose` - Whether to show verbose output
    /// * `data_path` - Path of the CSV dataset
    /// * `chart_dir` - Directory for generated chart images
    pub fn new(verbose: bool, data_path: PathBuf, chart_dir: PathBuf) -> Self {
        Self {
            verbose,
            data_path,
            chart_dir,
        }
    }

    /// Get the verbose flag
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get the dataset path
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Get the chart output directory
    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }
}
