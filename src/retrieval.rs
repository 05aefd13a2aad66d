//! Retrieval queries over the raw record set
//!
//! Each query resolves its filter columns first and aborts with
//! `ColumnNotFound` if one is missing. It then scans every record once,
//! keeps the ones that pass the filter, and projects a fixed set of display
//! columns. Missing display columns show as `N/A`.
//!
//! Text filters are trimmed and case-insensitive. A record whose numeric
//! filter field is missing or does not parse is skipped without failing the
//! query.

use std::fmt;

use log::debug;

use crate::error::WildlensResult;
use crate::record::{Record, RecordSet};
use crate::render;
use crate::schema::Column;

/// Projected rows of one retrieval query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Display columns, in output order
    pub columns: Vec<Column>,
    /// One projected tuple per matching record, in file order
    pub rows: Vec<Vec<String>>,
    /// Message printed in place of the table when nothing matched
    pub empty_message: String,
}

impl QueryResult {
    /// Number of matching records
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "{}", self.empty_message);
        }
        let headers: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        writeln!(f, "{}", render::grid(&headers, &self.rows))?;
        write!(f, "\nTotal records found: {}", self.rows.len())
    }
}

const NO_MATCHES: &str = "No records found matching criteria.";

/// Scan `set` once and project every record accepted by `filter`
fn scan<F>(set: &RecordSet, columns: &[Column], empty_message: String, filter: F) -> QueryResult
where
    F: Fn(&Record) -> bool,
{
    let rows: Vec<Vec<String>> = set
        .records()
        .iter()
        .filter(|record| filter(record))
        .map(|record| {
            columns
                .iter()
                .map(|column| set.project(record, *column))
                .collect()
        })
        .collect();

    debug!("Retrieval matched {} of {} records", rows.len(), set.len());
    QueryResult {
        columns: columns.to_vec(),
        rows,
        empty_message,
    }
}

/// Wildlife sightings recorded in `city`
pub fn wildlife_by_city(set: &RecordSet, city: &str) -> WildlensResult<QueryResult> {
    let city_idx = set.schema().require(Column::City)?;

    Ok(scan(
        set,
        &[
            Column::WildlifeSpecies,
            Column::SpeciesCategory,
            Column::NumberOfSightings,
            Column::IsEndangeredSpecies,
        ],
        format!("No wildlife sightings found for city '{}'.", city),
        |record| record.text_matches(city_idx, city),
    ))
}

/// Environmental readings for a time of day with air quality below `max_aqi`
pub fn environmental_context(
    set: &RecordSet,
    time_of_day: &str,
    max_aqi: f64,
) -> WildlensResult<QueryResult> {
    let time_idx = set.schema().require(Column::TimeOfDay)?;
    let aqi_idx = set.schema().require(Column::AirQualityIndex)?;

    Ok(scan(
        set,
        &[
            Column::Temperature,
            Column::Humidity,
            Column::AirQualityIndex,
            Column::WeatherCondition,
        ],
        NO_MATCHES.to_string(),
        |record| match record.number(aqi_idx) {
            Some(aqi) => record.text_matches(time_idx, time_of_day) && aqi < max_aqi,
            None => false,
        },
    ))
}

/// Human impact indicators where development and water proximity reach
/// the given minimums
pub fn human_impact(
    set: &RecordSet,
    min_urban_development: f64,
    min_water_proximity: f64,
) -> WildlensResult<QueryResult> {
    let urban_idx = set.schema().require(Column::UrbanDevelopmentIndex)?;
    let water_idx = set.schema().require(Column::ProximityToWaterSource)?;

    Ok(scan(
        set,
        &[
            Column::HumanActivityLevel,
            Column::NoiseLevel,
            Column::LightPollutionLevel,
            Column::GarbageManagementScore,
        ],
        NO_MATCHES.to_string(),
        |record| match (record.number(urban_idx), record.number(water_idx)) {
            (Some(urban), Some(water)) => {
                urban >= min_urban_development && water >= min_water_proximity
            }
            _ => false,
        },
    ))
}

/// Sightings longer than `min_duration` minutes during `season`
pub fn duration_by_season(
    set: &RecordSet,
    min_duration: f64,
    season: &str,
) -> WildlensResult<QueryResult> {
    let duration_idx = set.schema().require(Column::SightingDuration)?;
    let season_idx = set.schema().require(Column::Season)?;

    Ok(scan(
        set,
        &[
            Column::WildlifeSpecies,
            Column::NumberOfSightings,
            Column::SightingDuration,
            Column::Season,
        ],
        NO_MATCHES.to_string(),
        |record| match record.number(duration_idx) {
            Some(duration) => duration > min_duration && record.text_matches(season_idx, season),
            None => false,
        },
    ))
}

/// Numbered (1-based) listing of the header columns
pub fn column_listing(set: &RecordSet) -> String {
    let mut out = String::from("=== Available Columns ===");
    for (i, name) in set.schema().header().iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, name));
    }
    out
}
