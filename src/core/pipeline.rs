use crate::core::aggregate::aggregate_population;
use crate::core::join::join_tables;
use crate::core::rates::{derive_deaths, location_rates};
use crate::core::sources::{parse_death_rates_csv, parse_population_csv, parse_standard_table};
use crate::domain::model::{LocationRates, SourceTables, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

pub struct RatesPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

#[derive(Serialize)]
struct RatesReport<'a> {
    generated_at: String,
    year: u16,
    rates: &'a [LocationRates],
}

impl<S: Storage, C: ConfigProvider> RatesPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for RatesPipeline<S, C> {
    async fn extract(&self) -> Result<SourceTables> {
        tracing::debug!("Reading population source: {}", self.config.population_csv());
        let population_data = self.storage.read_file(self.config.population_csv()).await?;
        let population = parse_population_csv(
            &population_data,
            self.config.year(),
            self.config.locations(),
        )?;

        if population.is_empty() {
            return Err(EtlError::Processing {
                message: format!(
                    "no population rows matched year {} and the configured locations",
                    self.config.year()
                ),
            });
        }

        tracing::debug!("Reading death-rate source: {}", self.config.death_rates_csv());
        let rates_data = self.storage.read_file(self.config.death_rates_csv()).await?;
        let death_rates = parse_death_rates_csv(&rates_data, self.config.locations())?;

        tracing::debug!("Reading standard table: {}", self.config.standard_table());
        let standard_data = self.storage.read_file(self.config.standard_table()).await?;
        let standard_text =
            String::from_utf8_lossy(&standard_data).into_owned();
        let standard_weights = parse_standard_table(&standard_text)?;

        Ok(SourceTables {
            population,
            death_rates,
            standard_weights,
        })
    }

    async fn transform(&self, tables: SourceTables) -> Result<TransformResult> {
        let aggregated = aggregate_population(&tables.population)?;
        tracing::debug!("Aggregated into {} (location, band) totals", aggregated.len());

        let mut merged = join_tables(
            &aggregated,
            &tables.death_rates,
            &tables.standard_weights,
            self.config.locations(),
        )?;
        derive_deaths(&mut merged);

        let mut summaries = Vec::with_capacity(self.config.locations().len());
        for spec in self.config.locations() {
            summaries.push(location_rates(&spec.name, &merged)?);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "location",
            "age_group",
            "population_total",
            "death_rate",
            "who_world_weight",
            "number_of_deaths",
            "standardized_deaths",
        ])?;
        for record in &merged {
            let fields = [
                record.location.clone(),
                record.age_band.label().to_string(),
                record.population_total.to_string(),
                record.death_rate.to_string(),
                record.who_world_weight.to_string(),
                record.number_of_deaths.to_string(),
                record.standardized_deaths.to_string(),
            ];
            writer.write_record(&fields)?;
        }
        let csv_output = writer
            .into_inner()
            .map_err(|e| EtlError::Processing {
                message: format!("merged CSV buffer: {}", e),
            })
            .and_then(|buf| {
                String::from_utf8(buf).map_err(|e| EtlError::Processing {
                    message: format!("merged CSV is not UTF-8: {}", e),
                })
            })?;

        Ok(TransformResult {
            merged,
            summaries,
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path().trim_end_matches('/').to_string();

        let csv_path = format!("{}/merged_records.csv", output_path);
        self.storage
            .write_file(&csv_path, result.csv_output.as_bytes())
            .await?;

        let report = RatesReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            year: self.config.year(),
            rates: &result.summaries,
        };
        let json = serde_json::to_string_pretty(&report)?;
        let json_path = format!("{}/rates_summary.json", output_path);
        self.storage.write_file(&json_path, json.as_bytes()).await?;

        // The two scalars per location are the primary output.
        for summary in &result.summaries {
            println!("{}", summary);
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::etl::EtlEngine;
    use crate::domain::model::{AgeBand, LocationSpec};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::FileAccess(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        locations: Vec<LocationSpec>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                locations: vec![LocationSpec {
                    name: "Atlantis".to_string(),
                    rate_column: "rate_atlantis".to_string(),
                }],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn population_csv(&self) -> &str {
            "population.csv"
        }

        fn death_rates_csv(&self) -> &str {
            "death_rates.csv"
        }

        fn standard_table(&self) -> &str {
            "standard_table.txt"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn year(&self) -> u16 {
            2019
        }

        fn locations(&self) -> &[LocationSpec] {
            &self.locations
        }
    }

    const POPULATION_CSV: &str = "\
LocID,Location,Time,AgeGrp,PopTotal
1,Atlantis,2018,0,99.0
1,Atlantis,2019,0,10.0
1,Atlantis,2019,3,10.0
1,Atlantis,2019,7,30.0
1,Atlantis,2019,100+,10.0
2,Elsewhere,2019,0,77.0
";

    const DEATH_RATES_CSV: &str = "\
age_group,rate_atlantis
0-4,500
5-9,1000
85+,50000
";

    const STANDARD_TABLE: &str = "\
Table 1. Standard Population Distribution (percent)
Age group Segi Scandinavian WHO World
0-4 12.00 8.00 40
5-9 10.00 7.00 40
85+ 0.50 1.00 20
Total 100 100 100
";

    async fn seeded_pipeline() -> (RatesPipeline<MockStorage, MockConfig>, MockStorage) {
        let storage = MockStorage::new();
        storage.put("population.csv", POPULATION_CSV).await;
        storage.put("death_rates.csv", DEATH_RATES_CSV).await;
        storage.put("standard_table.txt", STANDARD_TABLE).await;
        let pipeline = RatesPipeline::new(storage.clone(), MockConfig::new());
        (pipeline, storage)
    }

    #[tokio::test]
    async fn extract_parses_all_three_sources() {
        let (pipeline, _storage) = seeded_pipeline().await;

        let tables = pipeline.extract().await.unwrap();

        // Year 2018 and Elsewhere rows filtered out.
        assert_eq!(tables.population.len(), 4);
        assert_eq!(tables.death_rates.len(), 3);
        assert_eq!(tables.standard_weights.len(), 3);
    }

    #[tokio::test]
    async fn extract_fails_on_missing_input_file() {
        let storage = MockStorage::new();
        let pipeline = RatesPipeline::new(storage, MockConfig::new());

        assert!(matches!(
            pipeline.extract().await,
            Err(EtlError::FileAccess(_))
        ));
    }

    #[tokio::test]
    async fn extract_fails_when_no_rows_match() {
        let storage = MockStorage::new();
        storage
            .put("population.csv", "Location,Time,AgeGrp,PopTotal\nAtlantis,1950,0,1.0\n")
            .await;
        storage.put("death_rates.csv", DEATH_RATES_CSV).await;
        storage.put("standard_table.txt", STANDARD_TABLE).await;
        let pipeline = RatesPipeline::new(storage, MockConfig::new());

        assert!(matches!(
            pipeline.extract().await,
            Err(EtlError::Processing { .. })
        ));
    }

    #[tokio::test]
    async fn transform_merges_and_computes_rates() {
        let (pipeline, _storage) = seeded_pipeline().await;

        let tables = pipeline.extract().await.unwrap();
        let result = pipeline.transform(tables).await.unwrap();

        // Bands 0-4 (20.0), 5-9 (30.0), 85+ (10.0), in fixed order.
        assert_eq!(result.merged.len(), 3);
        assert_eq!(result.merged[0].age_band, AgeBand::From0To4);
        assert_eq!(result.merged[0].population_total, 20.0);
        assert_eq!(result.merged[0].number_of_deaths, 0.1);
        assert_eq!(result.merged[1].age_band, AgeBand::From5To9);
        assert_eq!(result.merged[1].number_of_deaths, 0.3);
        assert_eq!(result.merged[2].age_band, AgeBand::Over85);
        assert_eq!(result.merged[2].number_of_deaths, 5.0);

        assert_eq!(result.summaries.len(), 1);
        let rates = &result.summaries[0];
        assert_eq!(rates.location, "Atlantis");
        // 5.4 deaths / 60.0 people = 0.09 -> 0.1 (literal unscaled crude rate)
        assert_eq!(rates.crude_death_rate, 0.1);
        // (0.04 + 0.12 + 1.0) / 100 * 100000 = 1160.0
        assert_eq!(rates.age_standardized_death_rate, 1160.0);

        let lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "location,age_group,population_total,death_rate,who_world_weight,number_of_deaths,standardized_deaths"
        );
        assert!(lines[1].starts_with("Atlantis,0-4,20,500,40,0.1,"));
    }

    #[tokio::test]
    async fn comma_in_location_name_survives_the_merged_csv() {
        let storage = MockStorage::new();
        storage
            .put(
                "population.csv",
                "Location,Time,AgeGrp,PopTotal\n\"Atlantis, Isle of\",2019,0,10.0\n",
            )
            .await;
        storage.put("death_rates.csv", DEATH_RATES_CSV).await;
        storage.put("standard_table.txt", STANDARD_TABLE).await;
        let config = MockConfig {
            locations: vec![LocationSpec {
                name: "Atlantis, Isle of".to_string(),
                rate_column: "rate_atlantis".to_string(),
            }],
        };
        let pipeline = RatesPipeline::new(storage, config);

        let tables = pipeline.extract().await.unwrap();
        let result = pipeline.transform(tables).await.unwrap();

        let lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("\"Atlantis, Isle of\",0-4,"));

        // The row parses back into exactly seven aligned fields.
        let mut reader = csv::Reader::from_reader(result.csv_output.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), 7);
        assert_eq!(&row[0], "Atlantis, Isle of");
        assert_eq!(&row[1], "0-4");
    }

    #[tokio::test]
    async fn transform_surfaces_missing_band_instead_of_dropping() {
        let storage = MockStorage::new();
        storage.put("population.csv", POPULATION_CSV).await;
        // 85+ row removed: plenty of 85+ population has no matching rate.
        storage
            .put("death_rates.csv", "age_group,rate_atlantis\n0-4,500\n5-9,1000\n")
            .await;
        storage.put("standard_table.txt", STANDARD_TABLE).await;
        let pipeline = RatesPipeline::new(storage, MockConfig::new());

        let tables = pipeline.extract().await.unwrap();
        match pipeline.transform(tables).await {
            Err(EtlError::MissingAgeBand { table, bands }) => {
                assert_eq!(table, "death rates");
                assert_eq!(bands, "85+");
            }
            other => panic!("expected MissingAgeBand, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn load_writes_merged_csv_and_summary_json() {
        let (pipeline, storage) = seeded_pipeline().await;

        let tables = pipeline.extract().await.unwrap();
        let result = pipeline.transform(tables).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output");

        let csv = storage.get("test_output/merged_records.csv").await.unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert!(csv.contains("Atlantis,85+,10,50000,20,5,1"));

        let json = storage.get("test_output/rates_summary.json").await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(report["year"], 2019);
        assert_eq!(report["rates"][0]["location"], "Atlantis");
        assert_eq!(report["rates"][0]["age_standardized_death_rate"], 1160.0);
        assert!(report["generated_at"].is_string());
    }

    #[tokio::test]
    async fn engine_runs_the_full_pipeline() {
        let (pipeline, storage) = seeded_pipeline().await;

        let engine = EtlEngine::new(pipeline);
        let output_path = engine.run().await.unwrap();

        assert_eq!(output_path, "test_output");
        assert!(storage.get("test_output/rates_summary.json").await.is_some());
    }
}
