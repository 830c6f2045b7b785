use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The 18 fixed five-year age bands used to align all three sources.
/// Variant order is the display order; `Ord` relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBand {
    From0To4,
    From5To9,
    From10To14,
    From15To19,
    From20To24,
    From25To29,
    From30To34,
    From35To39,
    From40To44,
    From45To49,
    From50To54,
    From55To59,
    From60To64,
    From65To69,
    From70To74,
    From75To79,
    From80To84,
    Over85,
}

impl AgeBand {
    pub const ALL: [AgeBand; 18] = [
        AgeBand::From0To4,
        AgeBand::From5To9,
        AgeBand::From10To14,
        AgeBand::From15To19,
        AgeBand::From20To24,
        AgeBand::From25To29,
        AgeBand::From30To34,
        AgeBand::From35To39,
        AgeBand::From40To44,
        AgeBand::From45To49,
        AgeBand::From50To54,
        AgeBand::From55To59,
        AgeBand::From60To64,
        AgeBand::From65To69,
        AgeBand::From70To74,
        AgeBand::From75To79,
        AgeBand::From80To84,
        AgeBand::Over85,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::From0To4 => "0-4",
            AgeBand::From5To9 => "5-9",
            AgeBand::From10To14 => "10-14",
            AgeBand::From15To19 => "15-19",
            AgeBand::From20To24 => "20-24",
            AgeBand::From25To29 => "25-29",
            AgeBand::From30To34 => "30-34",
            AgeBand::From35To39 => "35-39",
            AgeBand::From40To44 => "40-44",
            AgeBand::From45To49 => "45-49",
            AgeBand::From50To54 => "50-54",
            AgeBand::From55To59 => "55-59",
            AgeBand::From60To64 => "60-64",
            AgeBand::From65To69 => "65-69",
            AgeBand::From70To74 => "70-74",
            AgeBand::From75To79 => "75-79",
            AgeBand::From80To84 => "80-84",
            AgeBand::Over85 => "85+",
        }
    }

    pub fn from_label(label: &str) -> Option<AgeBand> {
        Self::ALL.iter().copied().find(|b| b.label() == label.trim())
    }

    /// Position in the fixed display order.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgeBand {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One location to report on: its name as it appears in the population
/// data, and the column of the death-rate table that carries its rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSpec {
    pub name: String,
    pub rate_column: String,
}

/// One row of the population source, ages still single-year.
/// `age` keeps the raw value as it appears in the file ("0".."99", "100+").
#[derive(Debug, Clone)]
pub struct PopulationRecord {
    pub location: String,
    pub age: String,
    pub year: u16,
    pub population_total: f64,
}

/// One row of the death-rate table: rates per 100,000 per year,
/// keyed by rate-column name.
#[derive(Debug, Clone)]
pub struct DeathRateRecord {
    pub age_band: AgeBand,
    pub rates_per_100k: HashMap<String, f64>,
}

/// One row of the standard-population table. Percentages per column,
/// nominally summing to 100 across bands.
#[derive(Debug, Clone)]
pub struct StandardWeightRecord {
    pub age_band: AgeBand,
    pub segi: f64,
    pub scandinavian: f64,
    pub who_world: f64,
}

/// Per-band join result for one location. The two derived columns are
/// filled in after the merge and are the only post-merge mutation.
#[derive(Debug, Clone)]
pub struct MergedRecord {
    pub location: String,
    pub age_band: AgeBand,
    pub population_total: f64,
    pub death_rate: f64,
    pub who_world_weight: f64,
    pub number_of_deaths: f64,
    pub standardized_deaths: f64,
}

/// The two reported scalars for one location, rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRates {
    pub location: String,
    pub crude_death_rate: f64,
    pub age_standardized_death_rate: f64,
}

impl fmt::Display for LocationRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.location)?;
        writeln!(
            f,
            "  Crude death rate: {:.1} deaths per 100,000",
            self.crude_death_rate
        )?;
        write!(
            f,
            "  Age-standardized death rate: {:.1} deaths per 100,000",
            self.age_standardized_death_rate
        )
    }
}

/// Output of the extract phase: the three sources, parsed and validated.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub population: Vec<PopulationRecord>,
    pub death_rates: Vec<DeathRateRecord>,
    pub standard_weights: Vec<StandardWeightRecord>,
}

/// Output of the transform phase.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub merged: Vec<MergedRecord>,
    pub summaries: Vec<LocationRates>,
    pub csv_output: String,
}
