//! Chart-producing queries
//!
//! Each chart is built in two steps: a pure function filters the table and
//! computes the plotted series, then a renderer draws it with plotters into a
//! PNG file. The file name is derived from the chart and its filter value, so
//! running the same chart twice overwrites the earlier image.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use plotters::element::Pie;
use plotters::prelude::*;
use regex::Regex;

use crate::aggregate::{mean_f64, round2};
use crate::analysis::endangered_subset;
use crate::error::{WildlensError, WildlensResult};
use crate::schema::Column;
use crate::table::{text_key, Table};

const TEMPERATURE_COLOR: RGBColor = RGBColor(255, 69, 0);
const HUMIDITY_COLOR: RGBColor = RGBColor(70, 130, 180);
const POINT_COLOR: RGBColor = RGBColor(255, 127, 80);
const PIE_COLORS: [RGBColor; 4] = [
    RGBColor(0xff, 0x99, 0x99),
    RGBColor(0x66, 0xb3, 0xff),
    RGBColor(0x99, 0xff, 0x99),
    RGBColor(0xff, 0xcc, 0x99),
];

type DrawResult = Result<(), Box<dyn Error>>;

/// What a chart query produced
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    /// The filter matched nothing; no file was written
    NoData(String),
    /// The chart was written to `path`
    Saved {
        path: PathBuf,
        /// Extra summary line printed after the file name
        note: Option<String>,
    },
}

impl fmt::Display for ChartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartOutcome::NoData(message) => write!(f, "{}", message),
            ChartOutcome::Saved { path, note } => {
                write!(f, "Chart saved as '{}'", path.display())?;
                if let Some(note) = note {
                    write!(f, "\n\n{}", note)?;
                }
                Ok(())
            }
        }
    }
}

/// File name for a chart, with the filter value made filesystem-safe
///
/// Every character other than an ASCII letter, digit, `-` or `_` becomes `_`.
pub fn chart_file_name(task: &str, filter: &str) -> WildlensResult<String> {
    let unsafe_chars =
        Regex::new(r"[^A-Za-z0-9_-]").map_err(|e| WildlensError::ChartError(e.to_string()))?;
    let safe = unsafe_chars.replace_all(filter.trim(), "_");
    if safe.is_empty() {
        Ok(format!("{}.png", task))
    } else {
        Ok(format!("{}_{}.png", task, safe))
    }
}

fn prepare_path(out_dir: &Path, task: &str, filter: &str) -> WildlensResult<PathBuf> {
    let file_name = chart_file_name(task, filter)?;
    fs::create_dir_all(out_dir)?;
    Ok(out_dir.join(file_name))
}

fn saved(path: PathBuf, drawn: DrawResult, note: Option<String>) -> WildlensResult<ChartOutcome> {
    drawn.map_err(|e| WildlensError::ChartError(e.to_string()))?;
    info!("Chart written to {}", path.display());
    Ok(ChartOutcome::Saved { path, note })
}

/// Padded bounds of a series, `0..1` when it is empty
fn span<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), v| {
        (low.min(v), high.max(v))
    });
    if low > high {
        (0.0, 1.0)
    } else {
        padded(low, high)
    }
}

/// Pad a value range so that a single point or a flat series still plots
fn padded(min: f64, max: f64) -> (f64, f64) {
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        let pad = (max - min) * 0.1;
        (min - pad, max + pad)
    }
}

/// Mean temperature and humidity of one city
#[derive(Debug, Clone, PartialEq)]
pub struct CityClimate {
    pub city: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Mean temperature and humidity per city for `season`, ordered by city
pub fn city_climate(table: &Table, season: &str) -> WildlensResult<Vec<CityClimate>> {
    let season_idx = table.require(Column::Season)?;
    let city = table.require(Column::City)?;
    let temperature = table.require(Column::Temperature)?;
    let humidity = table.require(Column::Humidity)?;

    let filtered = table.select(|row| row[season_idx].matches_text(season));
    if filtered.is_empty() {
        return Ok(Vec::new());
    }

    Ok(filtered
        .group_by(|row| text_key(&row[city]))
        .into_iter()
        .map(|(city, rows)| CityClimate {
            city,
            temperature: mean_f64(rows.iter().map(|row| &row[temperature])).map(round2),
            humidity: mean_f64(rows.iter().map(|row| &row[humidity])).map(round2),
        })
        .collect())
}

/// Grouped bar chart of temperature and humidity by city for a season
pub fn temperature_humidity_chart(
    table: &Table,
    season: &str,
    out_dir: &Path,
) -> WildlensResult<ChartOutcome> {
    let cities = city_climate(table, season)?;
    if cities.is_empty() {
        return Ok(ChartOutcome::NoData(format!(
            "No data found for season '{}'.",
            season
        )));
    }

    let path = prepare_path(out_dir, "c1_temp_humidity", season)?;
    let drawn = draw_climate(&path, season, &cities);
    saved(path, drawn, None)
}

fn draw_climate(path: &Path, season: &str, cities: &[CityClimate]) -> DrawResult {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let values: Vec<f64> = cities
        .iter()
        .flat_map(|c| [c.temperature, c.humidity])
        .flatten()
        .collect();
    let low = values.iter().copied().fold(0.0_f64, f64::min);
    let high = values.iter().copied().fold(0.0_f64, f64::max);
    let (_, top) = padded(low, high);

    // Three slots per city: temperature, humidity, gap.
    let slots = cities.len() as i32 * 3;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Average Temperature and Humidity by City - {}", season),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..slots, low..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots as usize + 1)
        .x_label_formatter(&|x| {
            if x % 3 == 1 {
                cities
                    .get((x / 3) as usize)
                    .map(|c| c.city.clone())
                    .unwrap_or_default()
            } else {
                String::new()
            }
        })
        .x_desc("City")
        .y_desc("Value")
        .draw()?;

    chart
        .draw_series(cities.iter().enumerate().filter_map(|(i, c)| {
            let x = i as i32 * 3;
            c.temperature
                .map(|t| Rectangle::new([(x, 0.0), (x + 1, t)], TEMPERATURE_COLOR.filled()))
        }))?
        .label("Avg Temperature (°C)")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], TEMPERATURE_COLOR.filled()));

    chart
        .draw_series(cities.iter().enumerate().filter_map(|(i, c)| {
            let x = i as i32 * 3 + 1;
            c.humidity
                .map(|h| Rectangle::new([(x, 0.0), (x + 1, h)], HUMIDITY_COLOR.filled()))
        }))?
        .label("Avg Humidity (%)")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], HUMIDITY_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Yearly mean sightings for every species category of one city
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTrends {
    /// Years in ascending order
    pub years: Vec<i64>,
    /// One series per category, ordered by category, aligned with `years`;
    /// years without sightings of a category hold 0
    pub series: Vec<(String, Vec<f64>)>,
}

/// Mean sightings per year and species category in `city`
pub fn species_trends(table: &Table, city: &str) -> WildlensResult<SpeciesTrends> {
    let city_idx = table.require(Column::City)?;
    let year = table.require(Column::Year)?;
    let category = table.require(Column::SpeciesCategory)?;
    let sightings = table.require(Column::NumberOfSightings)?;

    let filtered = table.select(|row| row[city_idx].matches_text(city));
    if filtered.is_empty() {
        return Ok(SpeciesTrends {
            years: Vec::new(),
            series: Vec::new(),
        });
    }

    let cells = filtered.group_by(|row| {
        let y = row[year].as_f64()?;
        Some((text_key(&row[category])?, y as i64))
    });

    let mut years: Vec<i64> = cells.keys().map(|(_, y)| *y).collect();
    years.sort_unstable();
    years.dedup();

    let mut series: Vec<(String, Vec<f64>)> = Vec::new();
    for ((name, y), rows) in &cells {
        if series.last().map(|(last, _)| last != name).unwrap_or(true) {
            series.push((name.clone(), vec![0.0; years.len()]));
        }
        if let (Some((_, means)), Ok(pos)) = (series.last_mut(), years.binary_search(y)) {
            means[pos] = mean_f64(rows.iter().map(|row| &row[sightings])).unwrap_or(0.0);
        }
    }

    Ok(SpeciesTrends { years, series })
}

/// Line chart of yearly sightings per species category in a city
pub fn species_trend_chart(table: &Table, city: &str, out_dir: &Path) -> WildlensResult<ChartOutcome> {
    let trends = species_trends(table, city)?;
    if trends.years.is_empty() {
        return Ok(ChartOutcome::NoData(format!("No data found for city '{}'.", city)));
    }

    let path = prepare_path(out_dir, "c2_species_trends", city)?;
    let drawn = draw_trends(&path, city, &trends);
    saved(path, drawn, None)
}

fn draw_trends(path: &Path, city: &str, trends: &SpeciesTrends) -> DrawResult {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let first = trends.years[0];
    let last = trends.years[trends.years.len() - 1];
    let (x_start, x_end) = if first == last {
        (first - 1, last + 1)
    } else {
        (first, last)
    };
    let high = trends
        .series
        .iter()
        .flat_map(|(_, means)| means.iter().copied())
        .fold(0.0_f64, f64::max);
    let (_, top) = padded(0.0, high);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Wildlife Sighting Trends by SpeciesCategory - {}", city),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_start..x_end, 0.0..top)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .x_desc("Year")
        .y_desc("Average NumberOfSightings")
        .draw()?;

    for (i, (category, means)) in trends.series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        let points: Vec<(i64, f64)> = trends.years.iter().copied().zip(means.iter().copied()).collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(category.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Mean public awareness per residential area type in `city`
///
/// Area types without any numeric awareness value are left out.
pub fn awareness_by_area(table: &Table, city: &str) -> WildlensResult<Vec<(String, f64)>> {
    let city_idx = table.require(Column::City)?;
    let area = table.require(Column::ResidentialAreaType)?;
    let awareness = table.require(Column::PublicAwarenessLevel)?;

    let filtered = table.select(|row| row[city_idx].matches_text(city));
    if filtered.is_empty() {
        return Ok(Vec::new());
    }

    Ok(filtered
        .group_by(|row| text_key(&row[area]))
        .into_iter()
        .filter_map(|(area, rows)| {
            mean_f64(rows.iter().map(|row| &row[awareness])).map(|mean| (area, mean))
        })
        .collect())
}

/// Pie chart of public awareness by residential area type in a city
pub fn awareness_chart(table: &Table, city: &str, out_dir: &Path) -> WildlensResult<ChartOutcome> {
    let shares = awareness_by_area(table, city)?;
    if shares.is_empty() {
        return Ok(ChartOutcome::NoData(format!("No data found for city '{}'.", city)));
    }
    if shares.iter().all(|(_, mean)| *mean <= 0.0) {
        return Ok(ChartOutcome::NoData(format!(
            "No positive PublicAwarenessLevel values for city '{}'.",
            city
        )));
    }

    let path = prepare_path(out_dir, "c3_awareness", city)?;
    let drawn = draw_awareness(&path, city, &shares);
    saved(path, drawn, None)
}

fn draw_awareness(path: &Path, city: &str, shares: &[(String, f64)]) -> DrawResult {
    let root = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(
        &format!("PublicAwarenessLevel by ResidentialAreaType - {}", city),
        ("sans-serif", 24),
    )?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let sizes: Vec<f64> = shares.iter().map(|(_, mean)| mean.max(0.0)).collect();
    let labels: Vec<String> = shares.iter().map(|(name, _)| name.clone()).collect();
    let colors: Vec<RGBColor> = (0..shares.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 16).into_font());
    pie.percentages(("sans-serif", 14).into_font());
    area.draw(&pie)?;

    root.present()?;
    Ok(())
}

/// One endangered-species sighting placed by noise level
#[derive(Debug, Clone, PartialEq)]
pub struct NoisePoint {
    pub species: String,
    pub noise: f64,
    pub sightings: f64,
}

/// Noise level and sightings of every endangered-species row
///
/// Returns the plotted points and the size of the endangered subset; rows
/// with a non-numeric noise level or sightings count are not plotted.
pub fn noise_points(table: &Table) -> WildlensResult<(Vec<NoisePoint>, usize)> {
    let noise = table.require(Column::NoiseLevel)?;
    let sightings = table.require(Column::NumberOfSightings)?;
    let species = table.require(Column::WildlifeSpecies)?;

    let endangered = endangered_subset(table)?;
    let points = endangered
        .rows()
        .iter()
        .filter_map(|row| {
            Some(NoisePoint {
                species: text_key(&row[species]).unwrap_or_default(),
                noise: row[noise].as_f64()?,
                sightings: row[sightings].as_f64()?,
            })
        })
        .collect();

    Ok((points, endangered.row_count()))
}

/// Annotated scatter plot of noise level against sightings for endangered
/// species
pub fn noise_scatter_chart(table: &Table, out_dir: &Path) -> WildlensResult<ChartOutcome> {
    let (points, total) = noise_points(table)?;
    if total == 0 {
        return Ok(ChartOutcome::NoData(
            "No endangered species found in dataset.".to_string(),
        ));
    }

    let path = prepare_path(out_dir, "c4_noise_scatter_endangered", "")?;
    let drawn = draw_noise(&path, &points);
    saved(
        path,
        drawn,
        Some(format!("Total endangered species records plotted: {}", total)),
    )
}

fn draw_noise(path: &Path, points: &[NoisePoint]) -> DrawResult {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_low, x_high) = span(points.iter().map(|p| p.noise));
    let (y_low, y_high) = span(points.iter().map(|p| p.sightings));

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Noise Level vs NumberOfSightings (Endangered Species Only)",
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_low..x_high, y_low..y_high)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .x_desc(Column::NoiseLevel.name())
        .y_desc(Column::NumberOfSightings.name())
        .draw()?;

    chart.draw_series(points.iter().map(|p| {
        EmptyElement::at((p.noise, p.sightings))
            + Circle::new((0, 0), 6, POINT_COLOR.mix(0.6).filled())
            + Circle::new((0, 0), 6, BLACK.stroke_width(1))
            + Text::new(p.species.clone(), (6, -14), ("sans-serif", 12).into_font())
    }))?;

    root.present()?;
    Ok(())
}
