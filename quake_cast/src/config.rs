//! Pipeline configuration
//!
//! Every section carries defaults so a partial JSON file (or none at all)
//! is enough to run the pipeline.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How the raw catalogue is cleaned before aggregation
    pub ingest: IngestConfig,
    /// Number of future years forecast by the forecast run
    pub horizon: usize,
    /// Number of held-out years scored by the evaluation run
    pub evaluation_horizon: usize,
    /// Last year included in the evaluation run's training split
    pub train_cutoff: i32,
    /// Decomposition model settings
    pub trend_seasonal: TrendSeasonalConfig,
    /// Recurrent model settings
    pub sequence: SequenceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            horizon: 2,
            evaluation_horizon: 3,
            train_cutoff: 2021,
            trend_seasonal: TrendSeasonalConfig::default(),
            sequence: SequenceConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing keys take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::ConfigError(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.evaluation_horizon == 0 {
            return Err(ForecastError::ConfigError(
                "evaluation_horizon must be at least 1".to_string(),
            ));
        }
        if self.ingest.time_column.trim().is_empty() {
            return Err(ForecastError::ConfigError(
                "ingest.time_column must not be empty".to_string(),
            ));
        }
        self.trend_seasonal.validate()?;
        self.sequence.validate()
    }
}

/// Catalogue cleaning rules applied by the ingestion collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Column holding the event time
    pub time_column: String,
    /// Mostly-empty station metadata that is never used for prediction
    pub excluded_columns: Vec<String>,
    /// Rows missing any of these columns are dropped
    pub required_columns: Vec<String>,
    /// Replace missing depth with the catalogue median
    pub fill_depth_with_median: bool,
    /// Placeholder for a missing place description
    pub unknown_place: String,
    /// Remove exact duplicate events
    pub drop_duplicates: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            time_column: "time".to_string(),
            excluded_columns: [
                "nst",
                "gap",
                "dmin",
                "rms",
                "horizontalerror",
                "deptherror",
                "magerror",
                "magnst",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            required_columns: ["time", "latitude", "longitude", "mag"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fill_depth_with_median: true,
            unknown_place: "Unknown".to_string(),
            drop_duplicates: true,
        }
    }
}

/// A periodic component of the decomposition model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    /// Label used in logs
    pub name: String,
    /// Cycle length, in periods (years)
    pub period: f64,
    /// Number of sine/cosine pairs
    pub fourier_order: usize,
}

/// Settings for the trend/seasonality decomposition model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSeasonalConfig {
    /// Upper bound on potential trend changepoints
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed
    pub changepoint_range: f64,
    /// Prior scale of the changepoint slope adjustments
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier coefficients
    pub seasonality_prior_scale: f64,
    /// Coverage of the uncertainty interval, in (0, 1)
    pub interval_width: f64,
    /// Periodic components; empty at annual granularity
    pub seasonalities: Vec<SeasonalityConfig>,
}

impl Default for TrendSeasonalConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
            seasonalities: Vec::new(),
        }
    }
}

impl TrendSeasonalConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "changepoint_range must be in (0, 1]".to_string(),
            ));
        }
        let positive = |x: f64| x > 0.0 && x.is_finite();
        if !positive(self.changepoint_prior_scale) || !positive(self.seasonality_prior_scale) {
            return Err(ForecastError::InvalidParameter(
                "prior scales must be positive and finite".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "interval_width must be between 0 and 1".to_string(),
            ));
        }
        for season in &self.seasonalities {
            if season.period <= 0.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "seasonality '{}' must have a positive period",
                    season.name
                )));
            }
        }
        Ok(())
    }
}

/// Non-linearity used for the recurrent cell's candidate and output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
}

/// Settings for the windowed recurrent model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Number of past periods fed into one prediction
    pub window: usize,
    /// Width of the recurrent hidden state
    pub hidden_units: usize,
    /// Passes over the training pairs
    pub epochs: usize,
    /// Training pairs per optimiser step
    pub batch_size: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Seed for weight initialisation and batch shuffling
    pub seed: u64,
    /// Cell non-linearity
    pub activation: Activation,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            window: 5,
            hidden_units: 50,
            epochs: 100,
            batch_size: 32,
            learning_rate: 0.001,
            seed: 42,
            activation: Activation::Relu,
        }
    }
}

impl SequenceConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }
        if self.hidden_units == 0 || self.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "hidden_units and batch_size must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "learning_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
