use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("File access error: {0}")]
    FileAccess(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML configuration error: {0}")]
    TomlConfig(#[from] toml::de::Error),

    #[error("Schema mismatch in {table}: expected column '{column}'")]
    SchemaMismatch { table: String, column: String },

    #[error("Invalid age value: '{value}'")]
    InvalidAge { value: String },

    #[error("Age band(s) present in population data but missing from {table}: {bands}")]
    MissingAgeBand { table: String, bands: String },

    #[error("Configuration error: missing field '{field}'")]
    MissingConfig { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    Processing { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::FileAccess(_) => ErrorSeverity::Critical,
            EtlError::MissingConfig { .. }
            | EtlError::InvalidConfigValue { .. }
            | EtlError::TomlConfig(_) => ErrorSeverity::Medium,
            EtlError::Csv(_)
            | EtlError::Serialization(_)
            | EtlError::SchemaMismatch { .. }
            | EtlError::InvalidAge { .. }
            | EtlError::MissingAgeBand { .. }
            | EtlError::Processing { .. } => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::FileAccess(e) => format!("Could not read or write a file: {}", e),
            EtlError::SchemaMismatch { table, column } => format!(
                "The {} table does not have the expected column '{}'",
                table, column
            ),
            EtlError::InvalidAge { value } => {
                format!("Unrecognized age value '{}' in the population data", value)
            }
            EtlError::MissingAgeBand { table, bands } => format!(
                "The {} table has no row for age band(s) {} present in the population data",
                table, bands
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::FileAccess(_) => "Check that the input paths exist and are readable",
            EtlError::Csv(_) => "Check that the input file is well-formed delimited text",
            EtlError::Serialization(_) => "Check the output directory is writable",
            EtlError::TomlConfig(_) => "Check the job file against the documented TOML layout",
            EtlError::SchemaMismatch { .. } => {
                "Check the source file headers against the expected schema"
            }
            EtlError::InvalidAge { .. } => {
                "Ages must be integers or a trailing-'+' open interval such as 100+"
            }
            EtlError::MissingAgeBand { .. } => {
                "Add rows for the missing band(s); dropping them would corrupt the standardized rate"
            }
            EtlError::MissingConfig { .. } | EtlError::InvalidConfigValue { .. } => {
                "Fix the configuration value and retry"
            }
            EtlError::Processing { .. } => "Inspect the input data for the reported row",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
