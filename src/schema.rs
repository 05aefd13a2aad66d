//! Column resolution for the wildlife dataset
//!
//! The dataset has a fixed, 23-column layout. This module names those columns
//! with the [`Column`] enum and resolves their positions once per header in a
//! [`Schema`], so queries never look columns up by string at scan time.
//!
//! Indices are 0-based. A column that is absent from the header resolves to
//! `None`, the not-found sentinel.

use std::fmt;

use crate::error::{WildlensError, WildlensResult};

/// Number of columns a valid dataset header must have
pub const EXPECTED_COLUMN_COUNT: usize = 23;

/// The known columns of the wildlife sighting dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    City,
    WildlifeSpecies,
    SpeciesCategory,
    NumberOfSightings,
    IsEndangeredSpecies,
    Season,
    NearbyGreenSpaces,
    TimeOfDay,
    AirQualityIndex,
    Temperature,
    Humidity,
    WeatherCondition,
    UrbanDevelopmentIndex,
    ProximityToWaterSource,
    HumanActivityLevel,
    NoiseLevel,
    LightPollutionLevel,
    GarbageManagementScore,
    SightingDuration,
    InteractionType,
    ResidentialAreaType,
    PublicAwarenessLevel,
    Year,
}

impl Column {
    /// Every known column, in the order of the reference dataset
    pub const ALL: [Column; EXPECTED_COLUMN_COUNT] = [
        Column::City,
        Column::WildlifeSpecies,
        Column::SpeciesCategory,
        Column::NumberOfSightings,
        Column::IsEndangeredSpecies,
        Column::Season,
        Column::NearbyGreenSpaces,
        Column::TimeOfDay,
        Column::AirQualityIndex,
        Column::Temperature,
        Column::Humidity,
        Column::WeatherCondition,
        Column::UrbanDevelopmentIndex,
        Column::ProximityToWaterSource,
        Column::HumanActivityLevel,
        Column::NoiseLevel,
        Column::LightPollutionLevel,
        Column::GarbageManagementScore,
        Column::SightingDuration,
        Column::InteractionType,
        Column::ResidentialAreaType,
        Column::PublicAwarenessLevel,
        Column::Year,
    ];

    /// Header name of the column as it appears in the CSV file
    pub fn name(self) -> &'static str {
        match self {
            Column::City => "City",
            Column::WildlifeSpecies => "WildlifeSpecies",
            Column::SpeciesCategory => "SpeciesCategory",
            Column::NumberOfSightings => "NumberOfSightings",
            Column::IsEndangeredSpecies => "IsEndangeredSpecies",
            Column::Season => "Season",
            Column::NearbyGreenSpaces => "NearbyGreenSpaces",
            Column::TimeOfDay => "TimeOfDay",
            Column::AirQualityIndex => "AirQualityIndex",
            Column::Temperature => "Temperature",
            Column::Humidity => "Humidity",
            Column::WeatherCondition => "WeatherCondition",
            Column::UrbanDevelopmentIndex => "UrbanDevelopmentIndex",
            Column::ProximityToWaterSource => "ProximityToWaterSource",
            Column::HumanActivityLevel => "HumanActivityLevel",
            Column::NoiseLevel => "NoiseLevel_dB",
            Column::LightPollutionLevel => "LightPollutionLevel",
            Column::GarbageManagementScore => "GarbageManagementScore",
            Column::SightingDuration => "SightingDuration_Min",
            Column::InteractionType => "InteractionType",
            Column::ResidentialAreaType => "ResidentialAreaType",
            Column::PublicAwarenessLevel => "PublicAwarenessLevel",
            Column::Year => "Year",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Find the 0-based index of `name` in `header`
///
/// Matching is exact and case-sensitive. Returns `None` when the header has
/// no such column.
pub fn resolve<S: AsRef<str>>(header: &[S], name: &str) -> Option<usize> {
    header.iter().position(|column| column.as_ref() == name)
}

/// A header together with the resolved position of every known column
#[derive(Debug, Clone)]
pub struct Schema {
    header: Vec<String>,
    indices: [Option<usize>; EXPECTED_COLUMN_COUNT],
}

impl Schema {
    /// Build a schema from a header row, resolving every known column once
    pub fn from_header(header: Vec<String>) -> Self {
        let mut indices = [None; EXPECTED_COLUMN_COUNT];
        for column in Column::ALL {
            indices[column.position()] = resolve(&header, column.name());
        }
        Schema { header, indices }
    }

    /// The header row the schema was built from
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of columns in the header
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Position of a known column, or `None` when the header lacks it
    pub fn index(&self, column: Column) -> Option<usize> {
        self.indices[column.position()]
    }

    /// Position of a column a query cannot run without
    pub fn require(&self, column: Column) -> WildlensResult<usize> {
        self.index(column)
            .ok_or_else(|| WildlensError::ColumnNotFound(column.name().to_string()))
    }
}
