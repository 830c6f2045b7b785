pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{JobSettings, LocalStorage};

pub use crate::core::{etl::EtlEngine, pipeline::RatesPipeline};
pub use domain::model::{AgeBand, LocationRates, LocationSpec};
pub use utils::error::{EtlError, Result};
