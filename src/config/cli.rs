use crate::config::{parse_location_spec, JobSettings};
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "mortality-etl")]
#[command(about = "Crude and age-standardized death rates from population, death-rate and standard-population tables")]
pub struct CliConfig {
    /// Population-by-single-year-age CSV (Location, Time, AgeGrp, PopTotal)
    #[arg(long)]
    pub population_csv: String,

    /// Age-specific death-rate CSV (age_group plus one column per location)
    #[arg(long)]
    pub death_rates_csv: String,

    /// Standard-population table as text extracted from the WHO PDF page
    #[arg(long)]
    pub standard_table: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "2019")]
    pub year: u16,

    /// Locations as 'Name=rate_column' pairs
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "United States of America=death_rate_us_2019,Uganda=death_rate_uganda_2019"
    )]
    pub locations: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system stats per pipeline phase")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn resolve(self) -> Result<JobSettings> {
        let locations = self
            .locations
            .iter()
            .map(|raw| parse_location_spec(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(JobSettings {
            population_csv: self.population_csv,
            death_rates_csv: self.death_rates_csv,
            standard_table: self.standard_table,
            output_path: self.output_path,
            year: self.year,
            locations,
        })
    }
}
