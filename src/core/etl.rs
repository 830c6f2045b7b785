use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Extracting source tables...");
        let tables = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} population rows, {} death-rate rows, {} standard-weight rows",
            tables.population.len(),
            tables.death_rates.len(),
            tables.standard_weights.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Transforming data...");
        let result = self.pipeline.transform(tables).await?;
        tracing::info!(
            "Merged {} band rows across {} location(s)",
            result.merged.len(),
            result.summaries.len()
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
