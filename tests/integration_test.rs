//! Integration tests for wildlens
//!
//! These drive the binary end to end: a fixture file is written to a
//! temporary directory and the menu session is scripted through stdin.

mod helpers;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use helpers::{sample_dataset, write_dataset, Sighting};

#[test]
fn test_city_scenario_totals() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data).write_stdin("1\n1\nLakeside\n6\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("File validated successfully."))
        .stdout(predicate::str::contains("Successfully loaded 3 records from CSV file."))
        .stdout(predicate::str::contains("Table loaded: 3 rows, 23 columns"))
        .stdout(predicate::str::contains("| Fox "))
        .stdout(predicate::str::contains("| Heron "))
        .stdout(predicate::str::contains("Owl").not())
        .stdout(predicate::str::contains("Total records found: 2"))
        .stdout(predicate::str::contains("Goodbye!"));

    Ok(())
}

#[test]
fn test_unknown_city_reports_without_charting() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;
    let charts = temp_dir.path().join("charts");

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data)
        .arg("--chart-dir")
        .arg(&charts)
        .write_stdin("1\n1\nNowhere\n6\n2\n2\nNowhere\n5\n3\n3\nNowhere\n5\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No wildlife sightings found for city 'Nowhere'."))
        .stdout(predicate::str::contains("No records found for city 'Nowhere'."))
        .stdout(predicate::str::contains("No data found for city 'Nowhere'."))
        .stdout(predicate::str::contains("Chart saved").not());

    assert!(!charts.exists());
    Ok(())
}

#[test]
fn test_wrong_column_count_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("narrow.csv");
    fs::write(&data, "City,Year,Season,Humidity,Temperature\nLakeside,2022,Spring,60,20\n")?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data).write_stdin("5\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Expected 23 columns, found 5 columns."))
        .stdout(predicate::str::contains("File validated successfully.").not());

    Ok(())
}

#[test]
fn test_missing_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = temp_dir.path().join("absent.csv");

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data).write_stdin("5\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist."));

    Ok(())
}

#[test]
fn test_path_is_prompted_when_not_given() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.write_stdin(format!("{}\n5\n", data.display()));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Enter CSV file path (or press Enter for default 'Urban_wildlife.csv'): ",
        ))
        .stdout(predicate::str::contains("File validated successfully."));

    Ok(())
}

#[test]
fn test_invalid_input_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data)
        .write_stdin("7\n2\n1\nlots\n9\n5\n1\n4\nten\n6\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Invalid choice. Please enter a number between 1 and 5.",
        ))
        .stdout(predicate::str::contains(
            "Error: Please enter a valid number for threshold.",
        ))
        .stdout(predicate::str::contains("Invalid choice. Please try again."))
        .stdout(predicate::str::contains(
            "Error: Please enter a valid number for duration.",
        ))
        .stdout(predicate::str::contains("Goodbye!"));

    Ok(())
}

#[test]
fn test_end_of_input_exits_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data).write_stdin("2\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("TASK B - TABLE ANALYSIS TASKS"))
        .stdout(predicate::str::contains("Goodbye!"));

    Ok(())
}

#[test]
fn test_green_space_bins() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data).write_stdin("2\n4\n5\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("| 0.2-0.4 "))
        .stdout(predicate::str::contains("| 0.8-1.0 "))
        .stdout(predicate::str::contains("0-0.2 ").not())
        .stdout(predicate::str::contains("Total endangered species records: 2"))
        .stdout(predicate::str::contains("Pearson Correlation Coefficient: 1.0000"));

    Ok(())
}

#[test]
fn test_identical_endangered_points_have_undefined_correlation(
) -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let endangered = Sighting::new()
        .with("IsEndangeredSpecies", "Yes")
        .with("NearbyGreenSpaces", "0.2")
        .with("NumberOfSightings", "4");
    let data = write_dataset(temp_dir.path(), &[endangered.clone(), endangered])?;

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data).write_stdin("2\n4\n5\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("| 0-0.2 "))
        .stdout(predicate::str::contains("Pearson Correlation Coefficient: NaN"));

    Ok(())
}

#[test]
fn test_climate_chart_is_saved_from_menu() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let data = sample_dataset(temp_dir.path())?;
    let charts = temp_dir.path().join("charts");

    let mut cmd = Command::cargo_bin("wildlens")?;
    cmd.arg(&data)
        .arg("--chart-dir")
        .arg(&charts)
        .write_stdin("3\n1\nSpring\n5\n5\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "=== Task C1: Temperature & Humidity by City (Spring) ===",
        ))
        .stdout(predicate::str::contains("Chart saved as"))
        .stdout(predicate::str::contains("c1_temp_humidity_Spring.png"));

    let chart = charts.join("c1_temp_humidity_Spring.png");
    assert!(fs::metadata(&chart)?.len() > 0);
    assert_eq!(fs::read_dir(&charts)?.count(), 1);
    Ok(())
}
