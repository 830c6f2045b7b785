use crate::domain::model::{LocationSpec, SourceTables, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn population_csv(&self) -> &str;
    fn death_rates_csv(&self) -> &str;
    fn standard_table(&self) -> &str;
    fn output_path(&self) -> &str;
    fn year(&self) -> u16;
    fn locations(&self) -> &[LocationSpec];
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceTables>;
    async fn transform(&self, tables: SourceTables) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
