#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::LocationSpec;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use std::fs;
use std::path::Path;

/// Resolved job settings, the single `ConfigProvider` the binaries hand to
/// the pipeline. Built from either the CLI flags or a TOML job file.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub population_csv: String,
    pub death_rates_csv: String,
    pub standard_table: String,
    pub output_path: String,
    pub year: u16,
    pub locations: Vec<LocationSpec>,
}

impl ConfigProvider for JobSettings {
    fn population_csv(&self) -> &str {
        &self.population_csv
    }

    fn death_rates_csv(&self) -> &str {
        &self.death_rates_csv
    }

    fn standard_table(&self) -> &str {
        &self.standard_table
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn year(&self) -> u16 {
        self.year
    }

    fn locations(&self) -> &[LocationSpec] {
        &self.locations
    }
}

impl Validate for JobSettings {
    fn validate(&self) -> Result<()> {
        validate_path("population_csv", &self.population_csv)?;
        validate_path("death_rates_csv", &self.death_rates_csv)?;
        validate_path("standard_table", &self.standard_table)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("year", self.year, 1950, 2100)?;

        if self.locations.is_empty() {
            return Err(EtlError::MissingConfig {
                field: "locations".to_string(),
            });
        }
        for spec in &self.locations {
            validate_non_empty_string("locations.name", &spec.name)?;
            validate_non_empty_string("locations.rate_column", &spec.rate_column)?;
        }

        Ok(())
    }
}

/// Parses a `Name=rate_column` pair as given on the command line.
pub fn parse_location_spec(raw: &str) -> Result<LocationSpec> {
    let (name, rate_column) = raw.split_once('=').ok_or_else(|| {
        EtlError::InvalidConfigValue {
            field: "locations".to_string(),
            value: raw.to_string(),
            reason: "Expected 'Location Name=rate_column'".to_string(),
        }
    })?;

    let spec = LocationSpec {
        name: name.trim().to_string(),
        rate_column: rate_column.trim().to_string(),
    };
    validate_non_empty_string("locations.name", &spec.name)?;
    validate_non_empty_string("locations.rate_column", &spec.rate_column)?;
    Ok(spec)
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
