//! # Quake Cast Workspace
//!
//! Entry point re-exporting the workspace crates:
//!
//! - [`quake_cast`]: ingestion, annual aggregation, the forecasters, the
//!   hybrid combiner, evaluation and the pipeline
//! - [`quake_math`]: numeric primitives the models are built on
//!
//! ## Example
//!
//! ```
//! use quake_cast_workspace::quake_cast::series::TimeSeriesAggregator;
//! use quake_cast_workspace::quake_cast::EventRecord;
//! use chrono::{TimeZone, Utc};
//!
//! let records: Vec<EventRecord> = [2001, 2001, 2004]
//!     .iter()
//!     .map(|&y| EventRecord::at(Utc.with_ymd_and_hms(y, 6, 1, 0, 0, 0).unwrap()))
//!     .collect();
//!
//! let series = TimeSeriesAggregator::new().aggregate(&records).unwrap();
//! assert_eq!(series.counts(), &[2, 0, 0, 1]);
//! ```

pub use quake_cast;
pub use quake_math;

#[cfg(test)]
mod tests {
    use super::*;
    use quake_cast::hybrid::{HybridCombiner, LabeledForecast};
    use quake_cast::models::ForecastSet;

    #[test]
    fn test_reexports_are_usable() {
        let scaler = quake_math::MinMaxScaler::fit(&[2.0, 4.0]).unwrap();
        assert_eq!(scaler.transform_value(3.0), 0.5);

        let combined = HybridCombiner::new()
            .combine(&[LabeledForecast::new(
                "only",
                ForecastSet::from_values(2024, &[1.0]),
            )])
            .unwrap();
        assert_eq!(combined.periods(), vec![2024]);
    }
}
