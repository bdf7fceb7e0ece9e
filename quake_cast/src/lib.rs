//! # Quake Cast
//!
//! Forecasting of annual seismic event counts.
//!
//! ## Features
//!
//! - Catalogue ingestion and cleaning (CSV via polars)
//! - Gap-free annual count series
//! - Piecewise-linear trend model with optional Fourier seasonality and
//!   uncertainty bounds
//! - Windowed LSTM model with recursive multi-step forecasting
//! - Unweighted hybrid ensemble over the period-wise inner join
//! - MAE / RMSE / R² evaluation on a held-out tail
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quake_cast::config::PipelineConfig;
//! use quake_cast::pipeline::ForecastPipeline;
//!
//! let pipeline = ForecastPipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run_csv("earthquakes.csv", true)?;
//!
//! for point in output.forecast.combined.points() {
//!     println!("{}: {:.1}", point.period, point.predicted_value);
//! }
//! output.write_to("exports")?;
//! # Ok::<(), quake_cast::ForecastError>(())
//! ```
//!
//! The components can also be used one by one:
//!
//! ```rust
//! use quake_cast::hybrid::{HybridCombiner, LabeledForecast};
//! use quake_cast::models::trend_seasonal::TrendSeasonalForecaster;
//! use quake_cast::models::{ForecastModel, ForecastSet, TrainedForecastModel};
//! use quake_cast::series::PeriodSeries;
//!
//! let series = PeriodSeries::new(2015, vec![120, 131, 118, 140, 152, 149, 160]);
//! let trained = TrendSeasonalForecaster::default().train(&series)?;
//! let trend = trained.forecast(2)?;
//! assert_eq!(trend.periods(), vec![2022, 2023]);
//!
//! let naive = ForecastSet::from_values(2022, &[160.0, 160.0]);
//! let combined = HybridCombiner::new().combine(&[
//!     LabeledForecast::new("trend", trend),
//!     LabeledForecast::new("naive", naive),
//! ])?;
//! assert_eq!(combined.periods(), vec![2022, 2023]);
//! # Ok::<(), quake_cast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod hybrid;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod series;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{CatalogLoader, EventRecord};
pub use crate::error::ForecastError;
pub use crate::hybrid::{CombinedForecastSet, HybridCombiner};
pub use crate::metrics::{EvaluationReport, Evaluator};
pub use crate::models::{ForecastModel, ForecastPoint, ForecastSet, TrainedForecastModel};
pub use crate::series::{PeriodSeries, TimeSeriesAggregator};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
