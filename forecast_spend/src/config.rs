//! Configuration for the forecaster and the prediction pipeline

use crate::error::Result;
use crate::records::RecordPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the supplementary historical file
pub const DEFAULT_HISTORY_FILE: &str = "training_data.json";

/// How seasonal effects combine with the trend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    /// `y = trend + seasonal`
    Additive,
    /// `y = trend * (1 + seasonal)`; seasonal swings scale with the level
    #[default]
    Multiplicative,
}

/// Trend shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    /// Piecewise-linear trend with change points
    #[default]
    Linear,
    /// Constant level, no change points
    Flat,
}

/// Tuning for the additive seasonal-trend forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    pub daily_seasonality: bool,
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    pub daily_order: usize,
    pub weekly_order: usize,
    pub yearly_order: usize,
    pub seasonality_mode: SeasonalityMode,
    pub growth: Growth,
    /// Upper bound on change points; fewer are used for short histories
    pub n_changepoints: usize,
    /// Fraction of the history change points may be placed in
    pub changepoint_range: f64,
    /// Laplace scale of the change-point slope adjustments
    pub changepoint_prior_scale: f64,
    /// Gaussian scale of the seasonal coefficients
    pub seasonality_prior_scale: f64,
    /// Gaussian scale of the holiday coefficients
    pub holidays_prior_scale: f64,
    /// Coverage of the predictive interval
    pub interval_width: f64,
    /// Holiday calendar to attach, if any
    pub holiday_region: Option<String>,
    /// Upper bound on fitting iterations
    pub max_iterations: usize,
    /// Relative parameter change under which the fit has converged
    pub tolerance: f64,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            daily_seasonality: true,
            weekly_seasonality: true,
            yearly_seasonality: true,
            daily_order: 4,
            weekly_order: 3,
            yearly_order: 10,
            seasonality_mode: SeasonalityMode::Multiplicative,
            growth: Growth::Linear,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.15,
            seasonality_prior_scale: 20.0,
            holidays_prior_scale: 10.0,
            interval_width: 0.9,
            holiday_region: Some("US".to_string()),
            max_iterations: 50,
            tolerance: 1e-6,
        }
    }
}

/// Settings for one prediction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Historical points a category needs before the forecaster is tried
    pub min_history_points: usize,
    /// Supplementary historical records file
    pub history_path: PathBuf,
    /// Handling of records that cannot be normalised
    pub record_policy: RecordPolicy,
    pub forecaster: ForecasterConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_history_points: 3,
            history_path: PathBuf::from(DEFAULT_HISTORY_FILE),
            record_policy: RecordPolicy::Strict,
            forecaster: ForecasterConfig::default(),
        }
    }
}

impl PredictorConfig {
    /// Load configuration from a JSON file; omitted fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
