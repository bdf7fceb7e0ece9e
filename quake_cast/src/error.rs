//! Error types for the quake_cast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the quake_cast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No usable period data (e.g. every record was filtered out upstream)
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Fewer points than a model needs to fit or window the series
    #[error("Insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The combiner has no period shared by all of its inputs
    #[error("No overlapping periods between forecast sets")]
    NoOverlap,

    /// Forecast and actuals do not line up one-to-one by period
    #[error("Misaligned input: forecast has {forecast} points, actual has {actual}")]
    MisalignedInput { forecast: usize, actual: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error reading or validating configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing delimited output
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from the numeric layer
    #[error("Math error: {0}")]
    Math(#[from] quake_math::MathError),
}

impl ForecastError {
    /// True for the data-sufficiency failures that end one model's run
    /// without invalidating the rest of the pipeline.
    pub fn is_data_sufficiency(&self) -> bool {
        matches!(
            self,
            ForecastError::EmptyInput(_)
                | ForecastError::InsufficientData { .. }
                | ForecastError::NoOverlap
                | ForecastError::MisalignedInput { .. }
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
