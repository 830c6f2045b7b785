//! The rate computation itself. Pure: same merged table in, same numbers
//! out, each location independent of the others.

use crate::domain::model::{LocationRates, MergedRecord};
use crate::utils::error::{EtlError, Result};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fills in the two derived columns on each merged row:
/// expected deaths if the band rate applied uniformly, and the same
/// weighted by the WHO World standard share of that band.
pub fn derive_deaths(records: &mut [MergedRecord]) {
    for record in records {
        record.number_of_deaths =
            round2(record.death_rate / 100_000.0 * record.population_total);
        record.standardized_deaths = record.death_rate / 100_000.0
            * record.population_total
            * record.who_world_weight
            / 100.0;
    }
}

/// Computes the two reported scalars for one location from its merged rows.
///
/// The crude rate reproduces the upstream computation exactly:
/// sum(number_of_deaths) / sum(population_total), with no x100,000 scaling.
/// That leaves it in deaths-per-person while the standardized rate is per
/// 100,000. The mismatch is intentional compatibility, logged as a warning.
pub fn location_rates(location: &str, records: &[MergedRecord]) -> Result<LocationRates> {
    let mut total_deaths = 0.0;
    let mut total_population = 0.0;
    let mut standardized_deaths = 0.0;
    let mut total_weight = 0.0;

    for record in records.iter().filter(|r| r.location == location) {
        total_deaths += record.number_of_deaths;
        total_population += record.population_total;
        standardized_deaths += record.standardized_deaths;
        total_weight += record.who_world_weight;
    }

    if total_population == 0.0 {
        return Err(EtlError::Processing {
            message: format!("no population rows merged for location '{}'", location),
        });
    }
    if total_weight == 0.0 {
        return Err(EtlError::Processing {
            message: format!(
                "standard weights sum to zero for location '{}'",
                location
            ),
        });
    }

    tracing::warn!(
        "{}: crude rate is computed as deaths per person, not per 100,000",
        location
    );

    Ok(LocationRates {
        location: location.to_string(),
        crude_death_rate: round1(total_deaths / total_population),
        age_standardized_death_rate: round1(standardized_deaths / total_weight * 100_000.0),
    })
}
