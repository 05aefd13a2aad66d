//! wildlens - interactive analysis of urban wildlife sighting data
//!
//! This tool loads a 23-column wildlife observation CSV file and offers
//! retrieval, aggregation and chart queries over it from a numbered menu.
//!
//! # Program Flow
//!
//! 1. Parse command-line arguments and set up logging
//! 2. Resolve the dataset path (argument or interactive prompt)
//! 3. Validate the header and load the file twice: as raw records and as a
//!    typed table
//! 4. Hand both to the interactive shell until the user exits, reading
//!    through a line editor when stdin is a terminal

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use log::{debug, LevelFilter};

use wildlens::cli::{self, WildlensArgs};
use wildlens::config::AppConfig;
use wildlens::csv_handler;
use wildlens::input::{LineSource, Scripted, Terminal};
use wildlens::shell::{self, Shell};

/// Main entry point for wildlens
///
/// Any failure before the shell starts (missing file, wrong column count,
/// unreadable data) is returned with context and ends the process with a
/// non-zero exit code.
fn main() -> Result<()> {
    // Step 1: Parse command-line arguments
    let args = cli::parse_args()?;

    // -v raises the default level; RUST_LOG still wins when set
    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();
    debug!("Arguments: {args:?}");

    let output = io::stdout().lock();
    if io::stdin().is_terminal() {
        let terminal = Terminal::new().context("Failed to start the line editor")?;
        run(args, terminal, output)
    } else {
        debug!("stdin is not a terminal, reading plain lines");
        run(args, Scripted::new(io::stdin().lock()), output)
    }
}

/// Load the dataset and run the session over the given input and output
fn run<L: LineSource, W: Write>(args: WildlensArgs, mut input: L, mut output: W) -> Result<()> {
    writeln!(output, "\nWelcome to Urban Wildlife Analysis System")?;

    // Step 2: Resolve the dataset path
    let data_path = match args.file {
        Some(path) => path,
        None => shell::prompt_data_path(&mut input, &mut output)
            .context("Failed to read the dataset path")?,
    };

    // Step 3: Validate and load the dataset
    csv_handler::validate(&data_path)
        .with_context(|| format!("Failed to validate file: {}", data_path.display()))?;
    writeln!(output, "File validated successfully.")?;

    let config = AppConfig::new(args.verbose, data_path, args.chart_dir);
    if config.verbose() {
        writeln!(output, "Running in verbose mode")?;
    }

    let records = csv_handler::load_records(config.data_path())
        .with_context(|| format!("Failed to load file: {}", config.data_path().display()))?;
    writeln!(
        output,
        "\nSuccessfully loaded {} records from CSV file.",
        records.len()
    )?;
    writeln!(output, "Columns: {}", records.schema().width())?;

    let table = csv_handler::load_table(config.data_path())
        .with_context(|| format!("Failed to load table: {}", config.data_path().display()))?;
    writeln!(
        output,
        "\nTable loaded: {} rows, {} columns",
        table.row_count(),
        table.column_count()
    )?;

    // Step 4: Run the interactive session
    Shell::new(&records, &table, &config, input, output)
        .run()
        .context("Interactive session failed")?;

    Ok(())
}
