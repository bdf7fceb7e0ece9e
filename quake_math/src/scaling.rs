//! Reversible min-max scaling.
//!
//! The scaler is fitted once and keeps its parameters so that model output
//! produced on the scaled range can be mapped back to the original units.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Linear map of a fitted range onto `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    range: f64,
}

impl MinMaxScaler {
    /// Fit the scaler to the observed minimum and maximum of `values`.
    ///
    /// A constant series gets a unit range so the transform stays invertible.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Scaler input must be finite".to_string(),
            ));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        Ok(Self {
            min,
            range: if range < 1e-10 { 1.0 } else { range },
        })
    }

    /// Lower end of the fitted range
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Width of the fitted range
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Scale a single value
    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.min) / self.range
    }

    /// Map a scaled value back to the original units
    pub fn inverse_value(&self, scaled: f64) -> f64 {
        scaled * self.range + self.min
    }

    /// Scale a slice of values
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_value(v)).collect()
    }

    /// Map a slice of scaled values back to the original units
    pub fn inverse_transform(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&v| self.inverse_value(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_maps_extremes_to_unit_interval() {
        let scaler = MinMaxScaler::fit(&[10.0, 30.0, 20.0]).unwrap();
        let scaled = scaler.transform(&[10.0, 20.0, 30.0]);
        assert_eq!(scaled, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_inverse_recovers_original_units() {
        let original = [5.0, 17.0, 11.0, 42.0];
        let scaler = MinMaxScaler::fit(&original).unwrap();
        let restored = scaler.inverse_transform(&scaler.transform(&original));
        for (a, b) in original.iter().zip(restored.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        // Values outside the fitted range extrapolate linearly
        assert_relative_eq!(scaler.inverse_value(1.5), 42.0 + 0.5 * 37.0);
    }

    #[test]
    fn test_constant_series_uses_unit_range() {
        let scaler = MinMaxScaler::fit(&[7.0, 7.0, 7.0]).unwrap();
        assert_relative_eq!(scaler.range(), 1.0);
        assert_relative_eq!(scaler.transform_value(7.0), 0.0);
        assert_relative_eq!(scaler.inverse_value(0.0), 7.0);
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
    }
}
