//! Menu-driven interactive shell
//!
//! The shell owns no data: it borrows the record set and the table loaded at
//! startup and dispatches menu choices to the retrieval, analysis and chart
//! queries. Answers come from a [`LineSource`] and output goes to any
//! `Write`, so the whole session can be driven from a script or a test buffer
//! as easily as from a terminal.
//!
//! End of input behaves like choosing Exit from wherever the user is.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;

use log::debug;

use crate::analysis;
use crate::config::{AppConfig, DEFAULT_DATA_FILE};
use crate::error::WildlensResult;
use crate::input::LineSource;
use crate::record::RecordSet;
use crate::retrieval;
use crate::table::Table;
use crate::visualize;

const MAIN_RULE: &str = "============================================================";
const MENU_RULE: &str = "------------------------------------------------------------";

/// Ask for the dataset path, falling back to the default on an empty answer
/// or closed input
pub fn prompt_data_path<L: LineSource, W: Write>(input: &mut L, output: &mut W) -> io::Result<PathBuf> {
    writeln!(output, "\n=== CSV File Loader ===")?;
    let prompt = format!(
        "Enter CSV file path (or press Enter for default '{}'): ",
        DEFAULT_DATA_FILE
    );

    match input.read_line(&prompt, output)? {
        Some(answer) if !answer.is_empty() => Ok(PathBuf::from(answer)),
        _ => Ok(PathBuf::from(DEFAULT_DATA_FILE)),
    }
}

/// Choices of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainChoice {
    Retrieval,
    Aggregation,
    Visualization,
    Pipeline,
    Exit,
}

impl MainChoice {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "1" => Some(MainChoice::Retrieval),
            "2" => Some(MainChoice::Aggregation),
            "3" => Some(MainChoice::Visualization),
            "4" => Some(MainChoice::Pipeline),
            "5" => Some(MainChoice::Exit),
            _ => None,
        }
    }
}

/// Where control goes after a sub-menu action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Show the same sub-menu again
    Stay,
    /// Return to the main menu
    Back,
    /// End the session
    Quit,
}

/// The interactive session
pub struct Shell<'a, L, W> {
    /// Row-based dataset for retrieval queries
    records: &'a RecordSet,
    /// Typed dataset for analysis and chart queries
    table: &'a Table,
    /// Session configuration
    config: &'a AppConfig,
    input: L,
    output: W,
}

impl<'a, L: LineSource, W: Write> Shell<'a, L, W> {
    /// Create a new shell over already loaded data
    pub fn new(records: &'a RecordSet, table: &'a Table, config: &'a AppConfig, input: L, output: W) -> Self {
        Self {
            records,
            table,
            config,
            input,
            output,
        }
    }

    /// Run the main menu loop until the user exits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_main_menu()?;
            let Some(choice) = self.read_line("Enter your choice (1-5): ")? else {
                break;
            };

            let flow = match MainChoice::parse(&choice) {
                Some(MainChoice::Retrieval) => self.retrieval_menu()?,
                Some(MainChoice::Aggregation) => self.aggregation_menu()?,
                Some(MainChoice::Visualization) => self.visualization_menu()?,
                Some(MainChoice::Pipeline) => {
                    self.run_pipeline()?;
                    Flow::Back
                }
                Some(MainChoice::Exit) => Flow::Quit,
                None => {
                    self.say("Invalid choice. Please enter a number between 1 and 5.")?;
                    Flow::Back
                }
            };

            if flow == Flow::Quit {
                break;
            }
        }

        self.say("\nThank you for using Urban Wildlife Analysis System!")?;
        self.say("Goodbye!")
    }

    /// Prompt for one trimmed line, `None` once input is closed
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let line = self.input.read_line(prompt, &mut self.output)?;
        if line.is_none() {
            debug!("Input closed at prompt {:?}", prompt);
            writeln!(self.output)?;
        }
        Ok(line)
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Print a section title followed by a query's report or its error
    fn report<T: Display>(&mut self, title: &str, result: WildlensResult<T>) -> io::Result<()> {
        writeln!(self.output, "\n{}\n", title)?;
        match result {
            Ok(report) => writeln!(self.output, "{}", report),
            Err(e) => writeln!(self.output, "Error: {}", e),
        }
    }

    fn show_main_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", MAIN_RULE)?;
        writeln!(self.output, "     URBAN WILDLIFE ANALYSIS")?;
        writeln!(self.output, "{}", MAIN_RULE)?;
        writeln!(self.output, "1. Task A - CSV Retrieval Tasks (A1-A4)")?;
        writeln!(self.output, "2. Task B - Table Analysis Tasks (B1-B4)")?;
        writeln!(self.output, "3. Task C - Visualization Tasks (C1-C4)")?;
        writeln!(self.output, "4. Run Full Pipeline (All Tasks)")?;
        writeln!(self.output, "5. Exit")?;
        writeln!(self.output, "{}", MAIN_RULE)
    }

    fn show_sub_menu(&mut self, title: &str, entries: &[&str]) -> io::Result<()> {
        writeln!(self.output, "\n{}", MENU_RULE)?;
        writeln!(self.output, "  {}", title)?;
        writeln!(self.output, "{}", MENU_RULE)?;
        for (i, entry) in entries.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, entry)?;
        }
        writeln!(self.output, "{}", MENU_RULE)
    }

    /// Loop a sub-menu until an action leaves it
    fn sub_menu<F>(&mut self, title: &str, entries: &[&str], mut action: F) -> io::Result<Flow>
    where
        F: FnMut(&mut Self, &str) -> io::Result<Flow>,
    {
        let prompt = format!("Enter your choice (1-{}): ", entries.len());
        loop {
            self.show_sub_menu(title, entries)?;
            let Some(choice) = self.read_line(&prompt)? else {
                return Ok(Flow::Quit);
            };
            match action(self, &choice)? {
                Flow::Stay => {}
                flow => return Ok(flow),
            }
        }
    }

    fn retrieval_menu(&mut self) -> io::Result<Flow> {
        self.sub_menu(
            "TASK A - CSV RETRIEVAL TASKS",
            &[
                "A1 - Wildlife Sightings by City",
                "A2 - Environmental Context",
                "A3 - Human Impact Indicators",
                "A4 - Custom Filter (Duration & Season)",
                "Show Available Columns",
                "Back to Main Menu",
            ],
            |shell, choice| match choice {
                "1" => shell.wildlife_by_city(),
                "2" => shell.environmental_context(),
                "3" => shell.human_impact(),
                "4" => shell.duration_by_season(),
                "5" => {
                    let listing = retrieval::column_listing(shell.records);
                    writeln!(shell.output, "\n{}", listing)?;
                    Ok(Flow::Stay)
                }
                "6" => Ok(Flow::Back),
                _ => invalid(shell),
            },
        )
    }

    fn wildlife_by_city(&mut self) -> io::Result<Flow> {
        let Some(city) = self.read_line("Enter city name: ")? else {
            return Ok(Flow::Quit);
        };
        self.report(
            &format!("=== Task A1: Wildlife Sightings in {} ===", city),
            retrieval::wildlife_by_city(self.records, &city),
        )?;
        Ok(Flow::Stay)
    }

    fn environmental_context(&mut self) -> io::Result<Flow> {
        let Some(time_of_day) = self.read_line("Enter TimeOfDay (e.g., Morning, Afternoon, Night): ")? else {
            return Ok(Flow::Quit);
        };
        let Some(text) = self.read_line("Enter maximum AQI threshold: ")? else {
            return Ok(Flow::Quit);
        };
        let Ok(max_aqi) = text.parse::<f64>() else {
            self.say("Error: Please enter a valid number for AQI threshold.")?;
            return Ok(Flow::Stay);
        };
        self.report(
            &format!(
                "=== Task A2: Environmental Context ({}, AQI < {:?}) ===",
                time_of_day, max_aqi
            ),
            retrieval::environmental_context(self.records, &time_of_day, max_aqi),
        )?;
        Ok(Flow::Stay)
    }

    fn human_impact(&mut self) -> io::Result<Flow> {
        let mut limits = [0.0; 2];
        let prompts = [
            "Enter minimum UrbanDevelopmentIndex: ",
            "Enter minimum Proximity to Water: ",
        ];
        for (limit, prompt) in limits.iter_mut().zip(prompts) {
            let Some(text) = self.read_line(prompt)? else {
                return Ok(Flow::Quit);
            };
            let Ok(value) = text.parse::<f64>() else {
                self.say("Error: Please enter valid numbers.")?;
                return Ok(Flow::Stay);
            };
            *limit = value;
        }
        let [min_urban, min_water] = limits;
        self.report(
            &format!(
                "=== Task A3: Human Impact Indicators ===\nFilters: Urban Dev Index >= {:?}, Proximity to Water >= {:?}",
                min_urban, min_water
            ),
            retrieval::human_impact(self.records, min_urban, min_water),
        )?;
        Ok(Flow::Stay)
    }

    fn duration_by_season(&mut self) -> io::Result<Flow> {
        let Some(text) = self.read_line("Enter minimum sighting duration (minutes): ")? else {
            return Ok(Flow::Quit);
        };
        let Ok(min_duration) = text.parse::<f64>() else {
            self.say("Error: Please enter a valid number for duration.")?;
            return Ok(Flow::Stay);
        };
        let Some(season) = self.read_line("Enter season (Spring, Summer, Fall, Winter): ")? else {
            return Ok(Flow::Quit);
        };
        self.report(
            &format!(
                "=== Task A4: Custom Filter (Duration > {:?} min, Season = {}) ===",
                min_duration, season
            ),
            retrieval::duration_by_season(self.records, min_duration, &season),
        )?;
        Ok(Flow::Stay)
    }

    fn aggregation_menu(&mut self) -> io::Result<Flow> {
        self.sub_menu(
            "TASK B - TABLE ANALYSIS TASKS",
            &[
                "B1 - Top Species in Green Zones",
                "B2 - Environmental Influence by City",
                "B3 - Human-Wildlife Interaction Analysis",
                "B4 - Green Space vs Sightings (Endangered)",
                "Back to Main Menu",
            ],
            |shell, choice| match choice {
                "1" => shell.top_species(),
                "2" => {
                    let Some(city) = shell.read_line("Enter city name: ")? else {
                        return Ok(Flow::Quit);
                    };
                    shell.report(
                        &format!("=== Task B2: Environmental Influence in {} ===", city),
                        analysis::environmental_influence(shell.table, &city),
                    )?;
                    Ok(Flow::Stay)
                }
                "3" => {
                    let Some(kind) =
                        shell.read_line("Enter InteractionType (e.g., Observation, Feeding, Conflict): ")?
                    else {
                        return Ok(Flow::Quit);
                    };
                    shell.report(
                        &format!("=== Task B3: Human-Wildlife Interaction Analysis ({}) ===", kind),
                        analysis::interaction_analysis(shell.table, &kind),
                    )?;
                    Ok(Flow::Stay)
                }
                "4" => {
                    shell.report(
                        "=== Task B4: Green Space vs Sightings (Endangered Species) ===",
                        analysis::green_space_correlation(shell.table),
                    )?;
                    Ok(Flow::Stay)
                }
                "5" => Ok(Flow::Back),
                _ => invalid(shell),
            },
        )
    }

    fn top_species(&mut self) -> io::Result<Flow> {
        let Some(text) = self.read_line("Enter minimum green space threshold: ")? else {
            return Ok(Flow::Quit);
        };
        let Ok(threshold) = text.parse::<f64>() else {
            self.say("Error: Please enter a valid number for threshold.")?;
            return Ok(Flow::Stay);
        };
        let Some(season) = self.read_line("Enter season: ")? else {
            return Ok(Flow::Quit);
        };
        self.run_top_species(threshold, &season)?;
        Ok(Flow::Stay)
    }

    fn run_top_species(&mut self, threshold: f64, season: &str) -> io::Result<()> {
        self.report(
            &format!(
                "=== Task B1: Top 3 Species in Green Zones ===\nFilters: Green Space > {:?}, Season = {}",
                threshold, season
            ),
            analysis::top_species_in_green_zones(self.table, threshold, season),
        )
    }

    fn visualization_menu(&mut self) -> io::Result<Flow> {
        self.sub_menu(
            "TASK C - VISUALIZATION TASKS",
            &[
                "C1 - Temperature & Humidity by City",
                "C2 - SpeciesCategory Trends",
                "C3 - Public Awareness Distribution",
                "C4 - Noise vs Sightings (Endangered)",
                "Back to Main Menu",
            ],
            |shell, choice| match choice {
                "1" => {
                    let Some(season) = shell.read_line("Enter season: ")? else {
                        return Ok(Flow::Quit);
                    };
                    shell.run_climate_chart(&season)?;
                    Ok(Flow::Stay)
                }
                "2" => {
                    let Some(city) = shell.read_line("Enter city name: ")? else {
                        return Ok(Flow::Quit);
                    };
                    shell.report(
                        &format!("=== Task C2: SpeciesCategory Trends in {} ===", city),
                        visualize::species_trend_chart(shell.table, &city, shell.config.chart_dir()),
                    )?;
                    Ok(Flow::Stay)
                }
                "3" => {
                    let Some(city) = shell.read_line("Enter city name: ")? else {
                        return Ok(Flow::Quit);
                    };
                    shell.report(
                        &format!("=== Task C3: Public Awareness Distribution in {} ===", city),
                        visualize::awareness_chart(shell.table, &city, shell.config.chart_dir()),
                    )?;
                    Ok(Flow::Stay)
                }
                "4" => {
                    shell.report(
                        "=== Task C4: Noise Level vs Sightings (Endangered Species) ===",
                        visualize::noise_scatter_chart(shell.table, shell.config.chart_dir()),
                    )?;
                    Ok(Flow::Stay)
                }
                "5" => Ok(Flow::Back),
                _ => invalid(shell),
            },
        )
    }

    fn run_climate_chart(&mut self, season: &str) -> io::Result<()> {
        self.report(
            &format!("=== Task C1: Temperature & Humidity by City ({}) ===", season),
            visualize::temperature_humidity_chart(self.table, season, self.config.chart_dir()),
        )
    }

    /// Run one sample query from each task group with fixed parameters
    fn run_pipeline(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", MAIN_RULE)?;
        writeln!(self.output, "  RUNNING FULL PIPELINE (SAMPLE TASKS)")?;
        writeln!(self.output, "{}", MAIN_RULE)?;

        self.say("\n[Running Sample Task A1]")?;
        self.report(
            "=== Task A1: Wildlife Sightings in New York ===",
            retrieval::wildlife_by_city(self.records, "New York"),
        )?;

        self.say("\n[Running Sample Task B1]")?;
        self.run_top_species(0.3, "Spring")?;

        self.say("\n[Running Sample Task C1]")?;
        self.run_climate_chart("Summer")?;

        writeln!(self.output, "\n{}", MAIN_RULE)?;
        writeln!(self.output, "  FULL PIPELINE COMPLETED")?;
        writeln!(self.output, "{}", MAIN_RULE)
    }
}

fn invalid<L: LineSource, W: Write>(shell: &mut Shell<'_, L, W>) -> io::Result<Flow> {
    shell.say("Invalid choice. Please try again.")?;
    Ok(Flow::Stay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Scripted;
    use crate::record::Record;
    use crate::schema::Schema;
    use crate::table::Value;
    use std::io::Cursor;

    const HEADER: [&str; 11] = [
        "City",
        "WildlifeSpecies",
        "SpeciesCategory",
        "NumberOfSightings",
        "IsEndangeredSpecies",
        "Season",
        "NearbyGreenSpaces",
        "AirQualityIndex",
        "Temperature",
        "Humidity",
        "Year",
    ];

    const ROWS: [[&str; 11]; 3] = [
        ["Lakeside", "Fox", "Mammal", "5", "No", "Spring", "0.7", "40", "18", "60", "2021"],
        ["Lakeside", "Heron", "Bird", "7", "Yes", "Spring", "0.9", "55", "19", "65", "2022"],
        ["Hillview", "Owl", "Bird", "2", "Yes", "Winter", "0.1", "80", "2", "70", "2022"],
    ];

    fn data() -> (RecordSet, Table) {
        let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
        let records = ROWS
            .iter()
            .map(|r| Record::new(r.iter().map(|f| f.to_string()).collect()))
            .collect();
        let mut table = Table::new(header.clone());
        for row in ROWS {
            table.add_row(row.iter().map(|v| Value::from(*v)).collect()).unwrap();
        }
        (RecordSet::new(Schema::from_header(header), records), table)
    }

    fn session(script: &str) -> String {
        let (records, table) = data();
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::new(false, PathBuf::from("test.csv"), dir.path().to_path_buf());
        let mut out = Vec::new();
        let input = Scripted::new(Cursor::new(script.to_string()));
        Shell::new(&records, &table, &config, input, &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_says_goodbye() {
        let out = session("5\n");
        assert!(out.contains("1. Task A - CSV Retrieval Tasks (A1-A4)"));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[test]
    fn test_end_of_input_is_exit() {
        let out = session("1\n");
        assert!(out.contains("TASK A - CSV RETRIEVAL TASKS"));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[test]
    fn test_invalid_choices_reprompt() {
        let out = session("9\n1\nx\n6\n5\n");
        assert!(out.contains("Invalid choice. Please enter a number between 1 and 5."));
        assert!(out.contains("Invalid choice. Please try again."));
        assert_eq!(out.matches("URBAN WILDLIFE ANALYSIS").count(), 3);
    }

    #[test]
    fn test_city_lookup_from_retrieval_menu() {
        let out = session("1\n1\n lakeside \n6\n5\n");
        assert!(out.contains("=== Task A1: Wildlife Sightings in lakeside ==="));
        assert!(out.contains("Total records found: 2"));
    }

    #[test]
    fn test_bad_number_returns_to_menu() {
        let out = session("1\n2\nMorning\nabc\n6\n5\n");
        assert!(out.contains("Error: Please enter a valid number for AQI threshold."));
        assert!(!out.contains("=== Task A2"));
        assert_eq!(out.matches("TASK A - CSV RETRIEVAL TASKS").count(), 2);
    }

    #[test]
    fn test_missing_column_keeps_session_alive() {
        let out = session("1\n3\n0.5\n0.5\n6\n5\n");
        assert!(out.contains("Error: Column 'UrbanDevelopmentIndex' not found."));
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn test_column_listing() {
        let out = session("1\n5\n6\n5\n");
        assert!(out.contains("=== Available Columns ===\n1. City"));
        assert!(out.contains("8. AirQualityIndex"));
    }

    #[test]
    fn test_top_species_from_analysis_menu() {
        let out = session("2\n1\n0.5\nspring\n5\n5\n");
        assert!(out.contains("Filters: Green Space > 0.5, Season = spring"));
        assert!(out.contains("Total records analyzed: 2"));
    }

    #[test]
    fn test_chart_without_data_reports_and_continues() {
        let out = session("3\n2\nNowhere\n5\n5\n");
        assert!(out.contains("No data found for city 'Nowhere'."));
    }

    #[test]
    fn test_pipeline_runs_sample_tasks() {
        let out = session("4\n5\n");
        assert!(out.contains("[Running Sample Task A1]"));
        assert!(out.contains("No wildlife sightings found for city 'New York'."));
        assert!(out.contains("Filters: Green Space > 0.3, Season = Spring"));
        assert!(out.contains("No data found for season 'Summer'."));
        assert!(out.contains("FULL PIPELINE COMPLETED"));
    }

    #[test]
    fn test_prompt_data_path_default() {
        let mut out = Vec::new();
        let path = prompt_data_path(&mut Scripted::new(Cursor::new("\n")), &mut out).unwrap();
        assert_eq!(path, PathBuf::from(DEFAULT_DATA_FILE));

        let path = prompt_data_path(&mut Scripted::new(Cursor::new("  data/other.csv \n")), &mut out).unwrap();
        assert_eq!(path, PathBuf::from("data/other.csv"));

        let path = prompt_data_path(&mut Scripted::new(Cursor::new("")), &mut out).unwrap();
        assert_eq!(path, PathBuf::from(DEFAULT_DATA_FILE));
    }
}
