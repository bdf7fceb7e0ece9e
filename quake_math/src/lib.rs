//! # Quake Math
//!
//! Numeric building blocks shared by the forecasting models.
//! Nothing in this crate knows about earthquakes, years or forecasts; it
//! works on plain `f64` slices.

use thiserror::Error;

pub mod fourier;
pub mod least_squares;
pub mod scaling;
pub mod stats;

pub use least_squares::penalized_least_squares;
pub use scaling::MinMaxScaler;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let err = MathError::InsufficientData("need 2 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 points"
        );

        let err = MathError::CalculationError("singular system".to_string());
        assert!(err.to_string().contains("singular system"));
    }
}
