//! Aggregation queries over the typed table
//!
//! Every query filters the table, returns early with an empty report when
//! nothing is left, and otherwise groups and aggregates the remaining rows.
//! Groups are ordered by their key. The reports render themselves through
//! `Display`, including the "no records" case.

use std::fmt;

use log::debug;

use crate::aggregate::{mean_f64, pearson, round2, AggregateFunction};
use crate::error::WildlensResult;
use crate::record::UNAVAILABLE;
use crate::render;
use crate::schema::Column;
use crate::table::{text_key, Row, Table, Value};

/// Number of species kept by the green zone ranking
pub const TOP_SPECIES: usize = 3;

/// Bin edges for NearbyGreenSpaces
pub const GREEN_SPACE_EDGES: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Labels of the NearbyGreenSpaces bins
pub const GREEN_SPACE_LABELS: [&str; 5] = ["0-0.2", "0.2-0.4", "0.4-0.6", "0.6-0.8", "0.8-1.0"];

fn optional_decimal(value: Option<f64>) -> String {
    value
        .map(render::decimal)
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn rounded_mean(rows: &[&Row], idx: usize) -> Option<f64> {
    mean_f64(rows.iter().map(|row| &row[idx])).map(round2)
}

/// Rows flagged as endangered species
pub fn endangered_subset(table: &Table) -> WildlensResult<Table> {
    let flag = table.require(Column::IsEndangeredSpecies)?;
    Ok(table.select(|row| row[flag].is_affirmative()))
}

/// Index of the green space bin holding `value`
///
/// Bins are closed on the right; the first bin is also closed on the left,
/// so 0.0 and 0.2 both fall in `0-0.2` and 1.0 falls in `0.8-1.0`. Values
/// outside [0, 1] belong to no bin.
pub fn green_space_bin(value: f64) -> Option<usize> {
    if value.is_nan() || value < GREEN_SPACE_EDGES[0] {
        return None;
    }
    GREEN_SPACE_EDGES[1..].iter().position(|upper| value <= *upper)
}

/// Most sighted species in green zones for one season
#[derive(Debug, Clone)]
pub struct TopSpecies {
    /// Species with their summed sightings, largest first, at most three
    pub ranking: Vec<(String, Value)>,
    /// Rows left after filtering
    pub analyzed: usize,
}

impl fmt::Display for TopSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.analyzed == 0 {
            return write!(f, "No records found matching criteria.");
        }
        let rows: Vec<Vec<String>> = self
            .ranking
            .iter()
            .map(|(species, total)| vec![species.clone(), total.to_string()])
            .collect();
        writeln!(f, "{}", render::grid(&["WildlifeSpecies", "Total Sightings"], &rows))?;
        write!(f, "\nTotal records analyzed: {}", self.analyzed)
    }
}

/// Top species by total sightings where green space exceeds `threshold`
/// during `season`
pub fn top_species_in_green_zones(
    table: &Table,
    threshold: f64,
    season: &str,
) -> WildlensResult<TopSpecies> {
    let green = table.require(Column::NearbyGreenSpaces)?;
    let season_idx = table.require(Column::Season)?;
    let species = table.require(Column::WildlifeSpecies)?;
    let sightings = table.require(Column::NumberOfSightings)?;

    let filtered = table.select(|row| {
        row[green].as_f64().map_or(false, |g| g > threshold) && row[season_idx].matches_text(season)
    });
    if filtered.is_empty() {
        return Ok(TopSpecies {
            ranking: Vec::new(),
            analyzed: 0,
        });
    }

    let mut ranking: Vec<(String, Value)> = filtered
        .group_by(|row| text_key(&row[species]))
        .into_iter()
        .map(|(name, rows)| {
            let total = match AggregateFunction::Sum.execute(rows.iter().map(|row| &row[sightings])) {
                Value::Null => Value::Integer(0),
                total => total,
            };
            (name, total)
        })
        .collect();

    // Stable sort keeps name order among equal totals.
    ranking.sort_by(|a, b| {
        let a = a.1.as_f64().unwrap_or(0.0);
        let b = b.1.as_f64().unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    ranking.truncate(TOP_SPECIES);

    debug!("Ranked {} species from {} rows", ranking.len(), filtered.row_count());
    Ok(TopSpecies {
        ranking,
        analyzed: filtered.row_count(),
    })
}

/// Mean sightings and duration for one weather and time-of-day pair
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceRow {
    pub weather: String,
    pub time_of_day: String,
    pub mean_sightings: Option<f64>,
    pub mean_duration: Option<f64>,
}

/// Environmental influence on sightings within one city
#[derive(Debug, Clone)]
pub struct EnvironmentalInfluence {
    pub city: String,
    pub groups: Vec<InfluenceRow>,
    pub analyzed: usize,
}

impl fmt::Display for EnvironmentalInfluence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.analyzed == 0 {
            return write!(f, "No records found for city '{}'.", self.city);
        }
        let rows: Vec<Vec<String>> = self
            .groups
            .iter()
            .map(|g| {
                vec![
                    g.weather.clone(),
                    g.time_of_day.clone(),
                    optional_decimal(g.mean_sightings),
                    optional_decimal(g.mean_duration),
                ]
            })
            .collect();
        writeln!(f, "Average Sightings and Duration by Weather & TimeOfDay:")?;
        writeln!(
            f,
            "{}",
            render::grid(
                &[
                    Column::WeatherCondition.name(),
                    Column::TimeOfDay.name(),
                    Column::NumberOfSightings.name(),
                    Column::SightingDuration.name(),
                ],
                &rows
            )
        )?;
        write!(f, "\nTotal records analyzed: {}", self.analyzed)
    }
}

/// Mean sightings and sighting duration in `city`, grouped by weather
/// condition and time of day
pub fn environmental_influence(table: &Table, city: &str) -> WildlensResult<EnvironmentalInfluence> {
    let city_idx = table.require(Column::City)?;
    let weather = table.require(Column::WeatherCondition)?;
    let time = table.require(Column::TimeOfDay)?;
    let sightings = table.require(Column::NumberOfSightings)?;
    let duration = table.require(Column::SightingDuration)?;

    let filtered = table.select(|row| row[city_idx].matches_text(city));
    if filtered.is_empty() {
        return Ok(EnvironmentalInfluence {
            city: city.to_string(),
            groups: Vec::new(),
            analyzed: 0,
        });
    }

    let groups = filtered
        .group_by(|row| Some((text_key(&row[weather])?, text_key(&row[time])?)))
        .into_iter()
        .map(|((weather, time_of_day), rows)| InfluenceRow {
            weather,
            time_of_day,
            mean_sightings: rounded_mean(&rows, sightings),
            mean_duration: rounded_mean(&rows, duration),
        })
        .collect();

    Ok(EnvironmentalInfluence {
        city: city.to_string(),
        groups,
        analyzed: filtered.row_count(),
    })
}

/// Conditions of long sightings in one residential area type
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRow {
    pub area: String,
    pub mean_noise: Option<f64>,
    pub common_activity: Value,
    pub mean_light_pollution: Option<f64>,
}

/// Human-wildlife interaction analysis for one interaction type
#[derive(Debug, Clone)]
pub struct InteractionReport {
    pub interaction: String,
    /// Rows of this interaction type
    pub matched: usize,
    /// Mean sighting duration over the matched rows, NaN if none is numeric
    pub average_duration: f64,
    pub groups: Vec<InteractionRow>,
    /// Rows whose duration is above the average
    pub analyzed: usize,
}

impl fmt::Display for InteractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matched == 0 {
            return write!(
                f,
                "No records found for InteractionType '{}'.",
                self.interaction
            );
        }
        writeln!(
            f,
            "Average sighting duration for '{}': {:.2} minutes",
            self.interaction, self.average_duration
        )?;
        if self.analyzed == 0 {
            return write!(f, "No sightings with duration above average.");
        }

        let rows: Vec<Vec<String>> = self
            .groups
            .iter()
            .map(|g| {
                let activity = if g.common_activity.is_null() {
                    UNAVAILABLE.to_string()
                } else {
                    g.common_activity.to_string()
                };
                vec![
                    g.area.clone(),
                    optional_decimal(g.mean_noise),
                    activity,
                    optional_decimal(g.mean_light_pollution),
                ]
            })
            .collect();
        writeln!(
            f,
            "\nAnalysis for sightings with duration > {:.2} min:",
            self.average_duration
        )?;
        writeln!(
            f,
            "{}",
            render::grid(
                &[
                    "ResidentialAreaType",
                    "Avg NoiseLevel_dB",
                    "Most Common Activity Level",
                    "Avg LightPollutionLevel",
                ],
                &rows
            )
        )?;
        write!(f, "\nRecords analyzed: {}", self.analyzed)
    }
}

/// Conditions of sightings that lasted longer than average for an
/// interaction type, grouped by residential area type
pub fn interaction_analysis(table: &Table, interaction: &str) -> WildlensResult<InteractionReport> {
    let kind = table.require(Column::InteractionType)?;
    let duration = table.require(Column::SightingDuration)?;
    let area = table.require(Column::ResidentialAreaType)?;
    let noise = table.require(Column::NoiseLevel)?;
    let activity = table.require(Column::HumanActivityLevel)?;
    let light = table.require(Column::LightPollutionLevel)?;

    let matched = table.select(|row| row[kind].matches_text(interaction));
    if matched.is_empty() {
        return Ok(InteractionReport {
            interaction: interaction.to_string(),
            matched: 0,
            average_duration: f64::NAN,
            groups: Vec::new(),
            analyzed: 0,
        });
    }

    let average_duration = mean_f64(matched.column_values(duration)).unwrap_or(f64::NAN);
    let longer = matched.select(|row| {
        row[duration]
            .as_f64()
            .map_or(false, |minutes| minutes > average_duration)
    });

    let groups = longer
        .group_by(|row| text_key(&row[area]))
        .into_iter()
        .map(|(area, rows)| InteractionRow {
            area,
            mean_noise: rounded_mean(&rows, noise),
            common_activity: AggregateFunction::Mode.execute(rows.iter().map(|row| &row[activity])),
            mean_light_pollution: rounded_mean(&rows, light),
        })
        .collect();

    Ok(InteractionReport {
        interaction: interaction.to_string(),
        matched: matched.row_count(),
        average_duration,
        groups,
        analyzed: longer.row_count(),
    })
}

/// Sightings statistics for one green space bin
#[derive(Debug, Clone, PartialEq)]
pub struct GreenSpaceBin {
    pub label: &'static str,
    pub mean_sightings: Option<f64>,
    pub observations: usize,
}

/// Green space against sightings for endangered species
#[derive(Debug, Clone)]
pub struct GreenSpaceCorrelation {
    /// Non-empty bins in ascending order
    pub bins: Vec<GreenSpaceBin>,
    /// Endangered rows analyzed
    pub total: usize,
    /// Pearson r between NearbyGreenSpaces and NumberOfSightings
    pub correlation: f64,
}

impl fmt::Display for GreenSpaceCorrelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return write!(f, "No endangered species found in dataset.");
        }
        let rows: Vec<Vec<String>> = self
            .bins
            .iter()
            .map(|b| {
                vec![
                    b.label.to_string(),
                    optional_decimal(b.mean_sightings),
                    b.observations.to_string(),
                ]
            })
            .collect();
        writeln!(f, "Correlation Analysis (Green Space Ranges):")?;
        writeln!(
            f,
            "{}",
            render::grid(
                &["Green_Space_Range", "Avg NumberOfSightings", "Count of Observations"],
                &rows
            )
        )?;
        writeln!(f, "\nTotal endangered species records: {}", self.total)?;
        write!(
            f,
            "\nPearson Correlation Coefficient: {:.4}",
            self.correlation
        )
    }
}

/// Bin endangered-species rows by NearbyGreenSpaces and correlate green
/// space with sightings
pub fn green_space_correlation(table: &Table) -> WildlensResult<GreenSpaceCorrelation> {
    let green = table.require(Column::NearbyGreenSpaces)?;
    let sightings = table.require(Column::NumberOfSightings)?;
    let species = table.require(Column::WildlifeSpecies)?;

    let endangered = endangered_subset(table)?;
    if endangered.is_empty() {
        return Ok(GreenSpaceCorrelation {
            bins: Vec::new(),
            total: 0,
            correlation: f64::NAN,
        });
    }

    let bins = endangered
        .group_by(|row| green_space_bin(row[green].as_f64()?))
        .into_iter()
        .map(|(bin, rows)| GreenSpaceBin {
            label: GREEN_SPACE_LABELS[bin],
            mean_sightings: rounded_mean(&rows, sightings),
            observations: rows.iter().filter(|row| !row[species].is_null()).count(),
        })
        .collect();

    let correlation = pearson(
        endangered
            .rows()
            .iter()
            .map(|row| (&row[green], &row[sightings])),
    );

    Ok(GreenSpaceCorrelation {
        bins,
        total: endangered.row_count(),
        correlation,
    })
}
