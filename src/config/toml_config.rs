use crate::config::JobSettings;
use crate::domain::model::LocationSpec;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A rates job described as a TOML file, for runs that are re-executed or
/// checked in next to the data rather than typed out as flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobInfo,
    pub inputs: InputsConfig,
    pub query: QueryConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub population_csv: String,
    pub death_rates_csv: String,
    pub standard_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub year: u16,
    pub locations: Vec<LocationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        let config: TomlConfig = toml::from_str(&processed)?;
        Ok(config)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn resolve(self) -> JobSettings {
        JobSettings {
            population_csv: self.inputs.population_csv,
            death_rates_csv: self.inputs.death_rates_csv,
            standard_table: self.inputs.standard_table,
            output_path: self.output.path,
            year: self.query.year,
            locations: self.query.locations,
        }
    }
}

/// Replaces `${VAR}` references with the environment value; an unset
/// variable is a configuration error, not an empty string.
fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| EtlError::Processing {
            message: format!("env substitution pattern failed to compile: {}", e),
        })?;

    let mut missing = None;
    let substituted = pattern.replace_all(content, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(field) = missing {
        return Err(EtlError::MissingConfig { field });
    }

    Ok(substituted.into_owned())
}
