use crate::core::bucket::bucket_age;
use crate::domain::model::{AgeBand, PopulationRecord};
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// Sums population totals per (location, band). The BTreeMap key order
/// gives the required output order: location-major, bands ascending.
pub fn aggregate_population(
    records: &[PopulationRecord],
) -> Result<BTreeMap<(String, AgeBand), f64>> {
    let mut totals: BTreeMap<(String, AgeBand), f64> = BTreeMap::new();

    for record in records {
        let band = bucket_age(&record.age)?;
        *totals
            .entry((record.location.clone(), band))
            .or_insert(0.0) += record.population_total;
    }

    Ok(totals)
}
