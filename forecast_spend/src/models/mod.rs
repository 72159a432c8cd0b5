//! Forecasting models for daily spending series

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use std::fmt::Debug;

/// Forecast result containing predicted values for a run of calendar dates
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Forecasted values, one per date
    pub(crate) values: Vec<f64>,
    /// Number of dates forecasted
    horizons: usize,
    /// Predictive intervals (optional)
    pub(crate) intervals: Option<Vec<(f64, f64)>>,
    /// Dates the values belong to
    pub(crate) dates: Vec<NaiveDate>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if values.len() != dates.len() {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match dates length ({})",
                values.len(),
                dates.len()
            )));
        }

        Ok(Self {
            horizons: values.len(),
            values,
            intervals: None,
            dates,
        })
    }

    /// Create a new forecast result with predictive intervals
    pub fn new_with_intervals(
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        let mut result = Self::new(dates, values)?;
        result.intervals = Some(intervals);
        Ok(result)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of dates forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Get the predictive intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Get the forecast dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Sum of the point forecasts with negative days counted as zero
    pub fn clamped_total(&self) -> f64 {
        self.values.iter().map(|v| v.max(0.0)).sum()
    }

    /// Interval of the clamped total, if intervals are available
    pub fn clamped_interval(&self) -> Option<(f64, f64)> {
        self.intervals.as_ref().map(|intervals| {
            intervals.iter().fold((0.0, 0.0), |(lo, hi), (l, u)| {
                (lo + l.max(0.0), hi + u.max(0.0))
            })
        })
    }
}

/// Consecutive calendar dates `as_of + 1 ..= as_of + horizon`
pub fn future_dates(as_of: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .filter_map(|offset| as_of.checked_add_signed(Duration::days(offset)))
        .collect()
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict values for arbitrary dates
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult>;

    /// Generate forecast for the `horizon` days after `as_of`
    fn forecast(&self, as_of: NaiveDate, horizon: usize) -> Result<ForecastResult> {
        self.predict(&future_dates(as_of, horizon))
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a daily series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a daily series
    fn train(&self, data: &DailySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod additive;
pub mod holidays;

pub use additive::{AdditiveModel, TrainedAdditiveModel};
pub use holidays::HolidayCalendar;
