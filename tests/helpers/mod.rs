//! Dataset fixtures for the end-to-end tests

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Header of a valid dataset, in file order
pub const HEADER: [&str; 23] = [
    "City",
    "WildlifeSpecies",
    "SpeciesCategory",
    "NumberOfSightings",
    "IsEndangeredSpecies",
    "Season",
    "NearbyGreenSpaces",
    "TimeOfDay",
    "AirQualityIndex",
    "Temperature",
    "Humidity",
    "WeatherCondition",
    "UrbanDevelopmentIndex",
    "ProximityToWaterSource",
    "HumanActivityLevel",
    "NoiseLevel_dB",
    "LightPollutionLevel",
    "GarbageManagementScore",
    "SightingDuration_Min",
    "InteractionType",
    "ResidentialAreaType",
    "PublicAwarenessLevel",
    "Year",
];

const DEFAULTS: [&str; 23] = [
    "Lakeside",
    "Fox",
    "Mammal",
    "1",
    "No",
    "Spring",
    "0.5",
    "Morning",
    "50",
    "20",
    "60",
    "Sunny",
    "0.5",
    "0.5",
    "Medium",
    "55",
    "30",
    "7",
    "10",
    "Observation",
    "Urban",
    "3",
    "2022",
];

/// One data row, built from defaults with a few fields overridden
#[derive(Debug, Clone)]
pub struct Sighting {
    fields: Vec<String>,
}

impl Sighting {
    pub fn new() -> Self {
        Sighting {
            fields: DEFAULTS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Override one column by header name
    pub fn with(mut self, column: &str, value: &str) -> Self {
        let idx = HEADER
            .iter()
            .position(|c| *c == column)
            .unwrap_or_else(|| panic!("unknown column {column}"));
        self.fields[idx] = value.to_string();
        self
    }
}

/// Write a dataset with the full header and the given rows
pub fn write_dataset(dir: &Path, rows: &[Sighting]) -> io::Result<PathBuf> {
    let mut content = HEADER.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(&row.fields.join(","));
        content.push('\n');
    }

    let path = dir.join("wildlife.csv");
    fs::write(&path, content)?;
    Ok(path)
}

/// Three sightings in two cities, two of them endangered
pub fn sample_dataset(dir: &Path) -> io::Result<PathBuf> {
    write_dataset(
        dir,
        &[
            Sighting::new()
                .with("WildlifeSpecies", "Fox")
                .with("NumberOfSightings", "5")
                .with("NearbyGreenSpaces", "0.2"),
            Sighting::new()
                .with("WildlifeSpecies", "Heron")
                .with("SpeciesCategory", "Bird")
                .with("NumberOfSightings", "7")
                .with("IsEndangeredSpecies", "Yes")
                .with("NearbyGreenSpaces", "1.0")
                .with("SightingDuration_Min", "25"),
            Sighting::new()
                .with("City", "Hillview")
                .with("WildlifeSpecies", "Owl")
                .with("SpeciesCategory", "Bird")
                .with("NumberOfSightings", "2")
                .with("IsEndangeredSpecies", "Yes")
                .with("NearbyGreenSpaces", "0.4")
                .with("Season", "Winter"),
        ],
    )
}
