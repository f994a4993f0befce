use thiserror::Error;

/// Error type for invalid estimates.
///
/// Every variant is fatal: the calculation that raised it is abandoned and no partial
/// result is produced. Field names are reported using their serialized (camelCase) form,
/// e.g. `gpuPowerW`.
#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Invalid {field}: expected a finite number greater than 0, got {value}")]
    InvalidInput { field: String, value: f64 },
    #[error("Nothing to estimate from. Provide processingTimeSeconds, usage, or energy")]
    MissingWorkload,
    #[error("Unsupported usage category: {0}")]
    UnsupportedCategory(String),
    #[error("{field} is required for usage category {category}")]
    MissingThroughput { field: String, category: String },
    #[error("Invalid range for {field}: min={min}, max={max}. {reason}")]
    InvalidRange {
        field: String,
        min: f64,
        max: f64,
        reason: String,
    },
    #[error("Invalid grid intensity dataset: {0}")]
    InvalidDataset(String),
    #[error("Could not parse grid intensity dataset: {0}")]
    DatasetParse(#[from] toml::de::Error),
}

impl ImpactError {
    /// Name of the input field responsible for the error, if the error concerns one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. }
            | Self::MissingThroughput { field, .. }
            | Self::InvalidRange { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Convenience type for `Result<T, ImpactError>`.
pub type CalcResult<T> = Result<T, ImpactError>;
