//! CLI argument parsing module for wildlens
//!
//! This module handles parsing command-line arguments using the clap crate.
//! Everything else about a session is chosen interactively from the menus;
//! the command line only names the dataset, the chart directory and the
//! verbosity.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Command-line arguments for wildlens
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Interactive analysis of urban wildlife sighting CSV files"
)]
pub struct WildlensArgs {
    /// CSV dataset to analyze
    ///
    /// When omitted, the program prompts for a path and offers
    /// `Urban_wildlife.csv` as the default.
    #[clap(help = "CSV dataset to analyze (prompted for when omitted)")]
    pub file: Option<PathBuf>,

    /// Directory that chart images are written into
    #[clap(
        short = 'o',
        long,
        default_value = ".",
        help = "Directory for generated chart images"
    )]
    pub chart_dir: PathBuf,

    /// Enable verbose diagnostic output
    ///
    /// Raises the default log level to `debug`. `RUST_LOG` still takes
    /// precedence when set.
    #[clap(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Parse command-line arguments into the WildlensArgs structure
pub fn parse_args() -> Result<WildlensArgs> {
    Ok(WildlensArgs::parse())
}
