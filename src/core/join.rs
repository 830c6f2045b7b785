use crate::domain::model::{
    AgeBand, DeathRateRecord, LocationSpec, MergedRecord, StandardWeightRecord,
};
use crate::utils::error::{EtlError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Joins the population aggregate with the death-rate and standard-weight
/// tables on age band. A band present in the population data but absent
/// from either lookup table is an error, never a silent drop: losing a band
/// here would shrink the standardized-rate denominator without a trace.
pub fn join_tables(
    population: &BTreeMap<(String, AgeBand), f64>,
    death_rates: &[DeathRateRecord],
    standard_weights: &[StandardWeightRecord],
    locations: &[LocationSpec],
) -> Result<Vec<MergedRecord>> {
    let rates_by_band: HashMap<AgeBand, &HashMap<String, f64>> = death_rates
        .iter()
        .map(|r| (r.age_band, &r.rates_per_100k))
        .collect();
    let weight_by_band: HashMap<AgeBand, f64> = standard_weights
        .iter()
        .map(|r| (r.age_band, r.who_world))
        .collect();

    let mut missing_rates: BTreeSet<AgeBand> = BTreeSet::new();
    let mut missing_weights: BTreeSet<AgeBand> = BTreeSet::new();
    let mut merged = Vec::with_capacity(population.len());

    for ((location, band), population_total) in population {
        let spec = locations
            .iter()
            .find(|spec| spec.name == *location)
            .ok_or_else(|| EtlError::Processing {
                message: format!("no rate column configured for location '{}'", location),
            })?;

        let death_rate = rates_by_band
            .get(band)
            .and_then(|rates| rates.get(&spec.rate_column).copied());
        let who_world_weight = weight_by_band.get(band).copied();

        if death_rate.is_none() {
            missing_rates.insert(*band);
        }
        if who_world_weight.is_none() {
            missing_weights.insert(*band);
        }
        let (Some(death_rate), Some(who_world_weight)) = (death_rate, who_world_weight) else {
            continue;
        };

        merged.push(MergedRecord {
            location: location.clone(),
            age_band: *band,
            population_total: *population_total,
            death_rate,
            who_world_weight,
            number_of_deaths: 0.0,
            standardized_deaths: 0.0,
        });
    }

    if !missing_rates.is_empty() {
        return Err(missing_band_error("death rates", &missing_rates));
    }
    if !missing_weights.is_empty() {
        return Err(missing_band_error("standard weights", &missing_weights));
    }

    Ok(merged)
}

fn missing_band_error(table: &str, bands: &BTreeSet<AgeBand>) -> EtlError {
    let labels: Vec<&str> = bands.iter().map(|b| b.label()).collect();
    EtlError::MissingAgeBand {
        table: table.to_string(),
        bands: labels.join(", "),
    }
}
