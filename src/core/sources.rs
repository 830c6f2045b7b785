//! Parsers for the three tabular sources. Column names are a contract:
//! each loader validates the headers it needs before reading any rows.

use crate::domain::model::{
    AgeBand, DeathRateRecord, LocationSpec, PopulationRecord, StandardWeightRecord,
};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

const POPULATION_TABLE: &str = "population";
const DEATH_RATE_TABLE: &str = "death rates";

const LOCATION_COLUMN: &str = "Location";
const YEAR_COLUMN: &str = "Time";
const AGE_COLUMN: &str = "AgeGrp";
const TOTAL_COLUMN: &str = "PopTotal";

const AGE_GROUP_COLUMN: &str = "age_group";

fn column_index(
    table: &str,
    headers: &csv::StringRecord,
    column: &str,
) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| EtlError::SchemaMismatch {
            table: table.to_string(),
            column: column.to_string(),
        })
}

fn parse_f64(table: &str, row: usize, column: &str, value: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| EtlError::Processing {
        message: format!(
            "{} row {}: '{}' is not a number in column '{}'",
            table, row, value, column
        ),
    })
}

/// Reads the population-by-single-year-age CSV, keeping only rows for the
/// requested year and locations. Ages are left unbucketed here.
pub fn parse_population_csv(
    data: &[u8],
    year: u16,
    locations: &[LocationSpec],
) -> Result<Vec<PopulationRecord>> {
    let mut reader = csv::ReaderBuilder::new().from_reader(data);
    let headers = reader.headers()?.clone();

    let location_idx = column_index(POPULATION_TABLE, &headers, LOCATION_COLUMN)?;
    let year_idx = column_index(POPULATION_TABLE, &headers, YEAR_COLUMN)?;
    let age_idx = column_index(POPULATION_TABLE, &headers, AGE_COLUMN)?;
    let total_idx = column_index(POPULATION_TABLE, &headers, TOTAL_COLUMN)?;

    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let row_year: u16 = match record.get(year_idx).unwrap_or("").trim().parse() {
            Ok(y) => y,
            Err(_) => continue, // non-numeric year rows are not data rows
        };
        if row_year != year {
            continue;
        }

        let location = record.get(location_idx).unwrap_or("").trim();
        if !locations.iter().any(|spec| spec.name == location) {
            continue;
        }

        let raw_total = record.get(total_idx).unwrap_or("");
        let population_total = parse_f64(POPULATION_TABLE, row + 1, TOTAL_COLUMN, raw_total)?;

        records.push(PopulationRecord {
            location: location.to_string(),
            age: record.get(age_idx).unwrap_or("").trim().to_string(),
            year: row_year,
            population_total,
        });
    }

    tracing::debug!(
        "Population source: kept {} rows for year {}",
        records.len(),
        year
    );

    Ok(records)
}

/// Reads the age-specific death-rate CSV. The first column carries the band
/// label; every configured rate column must be present in the header.
pub fn parse_death_rates_csv(
    data: &[u8],
    locations: &[LocationSpec],
) -> Result<Vec<DeathRateRecord>> {
    let mut reader = csv::ReaderBuilder::new().from_reader(data);
    let headers = reader.headers()?.clone();

    let age_idx = column_index(DEATH_RATE_TABLE, &headers, AGE_GROUP_COLUMN)?;
    let mut rate_indices: Vec<(&str, usize)> = Vec::new();
    for spec in locations {
        let idx = column_index(DEATH_RATE_TABLE, &headers, &spec.rate_column)?;
        rate_indices.push((spec.rate_column.as_str(), idx));
    }

    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let raw_band = record.get(age_idx).unwrap_or("");

        let age_band =
            AgeBand::from_label(raw_band).ok_or_else(|| EtlError::InvalidAge {
                value: raw_band.to_string(),
            })?;

        let mut rates_per_100k = HashMap::new();
        for (column, idx) in &rate_indices {
            let raw = record.get(*idx).unwrap_or("");
            let rate = parse_f64(DEATH_RATE_TABLE, row + 1, column, raw)?;
            rates_per_100k.insert(column.to_string(), rate);
        }

        records.push(DeathRateRecord {
            age_band,
            rates_per_100k,
        });
    }

    tracing::debug!("Death-rate source: {} band rows", records.len());

    Ok(records)
}

/// Reads the standard-population table as whitespace-separated text, the
/// form it takes once extracted from the published PDF page. Data rows
/// start with a band label followed by the Segi, Scandinavian and WHO World
/// percentages; header and footer lines (including the trailing totals row)
/// simply do not match and are skipped.
pub fn parse_standard_table(text: &str) -> Result<Vec<StandardWeightRecord>> {
    let mut records = Vec::new();

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        let Some(age_band) = AgeBand::from_label(first) else {
            continue;
        };

        let fields: Vec<&str> = tokens.collect();
        if fields.len() < 3 {
            return Err(EtlError::Processing {
                message: format!(
                    "standard table row '{}' has {} weight column(s), expected 3",
                    first,
                    fields.len()
                ),
            });
        }

        records.push(StandardWeightRecord {
            age_band,
            segi: parse_f64("standard table", age_band.index() + 1, "Segi", fields[0])?,
            scandinavian: parse_f64(
                "standard table",
                age_band.index() + 1,
                "Scandinavian",
                fields[1],
            )?,
            who_world: parse_f64(
                "standard table",
                age_band.index() + 1,
                "WHO World",
                fields[2],
            )?,
        });
    }

    tracing::debug!("Standard-population source: {} band rows", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<LocationSpec> {
        vec![
            LocationSpec {
                name: "Uganda".to_string(),
                rate_column: "death_rate_uganda_2019".to_string(),
            },
            LocationSpec {
                name: "United States of America".to_string(),
                rate_column: "death_rate_us_2019".to_string(),
            },
        ]
    }

    #[test]
    fn population_rows_are_filtered_by_year_and_location() {
        let csv = "\
LocID,Location,Time,AgeGrp,PopTotal
800,Uganda,2018,0,1300.0
800,Uganda,2019,0,1400.5
800,Uganda,2019,100+,0.2
840,United States of America,2019,30,4200.0
250,France,2019,30,800.0
";
        let records = parse_population_csv(csv.as_bytes(), 2019, &locations()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].location, "Uganda");
        assert_eq!(records[0].age, "0");
        assert_eq!(records[0].population_total, 1400.5);
        assert_eq!(records[1].age, "100+");
    }

    #[test]
    fn population_missing_column_is_schema_mismatch() {
        let csv = "Location,Time,AgeGrp\nUganda,2019,0\n";
        match parse_population_csv(csv.as_bytes(), 2019, &locations()) {
            Err(EtlError::SchemaMismatch { table, column }) => {
                assert_eq!(table, "population");
                assert_eq!(column, "PopTotal");
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn population_bad_total_is_reported_with_row() {
        let csv = "Location,Time,AgeGrp,PopTotal\nUganda,2019,0,abc\n";
        match parse_population_csv(csv.as_bytes(), 2019, &locations()) {
            Err(EtlError::Processing { message }) => {
                assert!(message.contains("row 1"), "message was: {}", message);
            }
            other => panic!("expected Processing, got {:?}", other),
        }
    }

    #[test]
    fn death_rates_are_parsed_per_configured_column() {
        let csv = "\
age_group,death_rate_us_2019,death_rate_uganda_2019
0-4,0.3,14.0
85+,1200.5,2100.0
";
        let records = parse_death_rates_csv(csv.as_bytes(), &locations()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].age_band, AgeBand::Over85);
        assert_eq!(
            records[1].rates_per_100k.get("death_rate_uganda_2019"),
            Some(&2100.0)
        );
    }

    #[test]
    fn death_rates_missing_rate_column_is_schema_mismatch() {
        let csv = "age_group,death_rate_us_2019\n0-4,0.3\n";
        match parse_death_rates_csv(csv.as_bytes(), &locations()) {
            Err(EtlError::SchemaMismatch { column, .. }) => {
                assert_eq!(column, "death_rate_uganda_2019");
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn death_rates_unknown_band_is_invalid_age() {
        let csv = "age_group,death_rate_us_2019,death_rate_uganda_2019\n90+,1.0,2.0\n";
        assert!(matches!(
            parse_death_rates_csv(csv.as_bytes(), &locations()),
            Err(EtlError::InvalidAge { .. })
        ));
    }

    #[test]
    fn standard_table_keeps_band_rows_and_skips_the_rest() {
        let text = "\
Table 1. Standard Population Distribution (percent)
Age group Segi Scandinavian WHO World
0-4 12.00 5.53 8.86
5-9 10.00 5.47 8.69
85+ 0.50 1.57 0.63
Total 100 100 100
* Source: see text.
";
        let records = parse_standard_table(text).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].age_band, AgeBand::From0To4);
        assert_eq!(records[0].who_world, 8.86);
        assert_eq!(records[2].age_band, AgeBand::Over85);
        assert_eq!(records[2].segi, 0.50);
    }

    #[test]
    fn standard_table_short_band_row_is_an_error() {
        let text = "0-4 12.00 5.53\n";
        assert!(matches!(
            parse_standard_table(text),
            Err(EtlError::Processing { .. })
        ));
    }
}
