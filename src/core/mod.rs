pub mod aggregate;
pub mod bucket;
pub mod etl;
pub mod join;
pub mod pipeline;
pub mod rates;
pub mod sources;

pub use crate::domain::model::{
    AgeBand, DeathRateRecord, LocationRates, LocationSpec, MergedRecord, PopulationRecord,
    SourceTables, StandardWeightRecord, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
