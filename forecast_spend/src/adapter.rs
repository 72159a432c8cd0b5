//! Forecast adapter: historical records in, projected additional spend out

use crate::config::ForecasterConfig;
use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    AdditiveModel, ForecastModel, ForecastResult, HolidayCalendar, TrainedForecastModel,
};
use crate::records::ExpenseRecord;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Fewest historical points the forecaster is ever fitted on
pub const MIN_FORECAST_POINTS: usize = 3;

/// Wraps a forecast model and turns its daily predictions into one amount
#[derive(Debug, Clone)]
pub struct ForecastAdapter<M: ForecastModel> {
    model: M,
    min_points: usize,
}

impl ForecastAdapter<AdditiveModel> {
    /// Additive seasonal-trend adapter with best-effort holiday enrichment.
    ///
    /// A missing holiday calendar is logged and the model is used without it.
    pub fn additive(config: &ForecasterConfig, min_points: usize) -> Result<Self> {
        let mut model = AdditiveModel::new(config.clone())?;

        if let Some(region) = &config.holiday_region {
            match HolidayCalendar::for_region(region) {
                Ok(calendar) => {
                    debug!(
                        "Attached {} holiday calendar ({} holidays)",
                        calendar.region(),
                        calendar.names().len()
                    );
                    model = model.with_holidays(calendar);
                }
                Err(e) => warn!("Continuing without holidays: {}", e),
            }
        }

        Ok(Self::new(model, min_points))
    }
}

impl<M: ForecastModel> ForecastAdapter<M> {
    /// Create an adapter around `model`; `min_points` is raised to the absolute floor
    pub fn new(model: M, min_points: usize) -> Self {
        Self {
            model,
            min_points: min_points.max(MIN_FORECAST_POINTS),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Historical points required before the model is fitted
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Daily predictions for the `horizon` days after `as_of`
    pub fn project(
        &self,
        historical: &[ExpenseRecord],
        horizon: usize,
        as_of: NaiveDate,
    ) -> Result<ForecastResult> {
        if historical.len() < self.min_points {
            return Err(ForecastError::ForecastUnavailable(format!(
                "{} historical points, need at least {}",
                historical.len(),
                self.min_points
            )));
        }

        let series = DailySeries::from_records(historical)?;
        let trained = self.model.train(&series)?;
        trained.forecast(as_of, horizon)
    }

    /// Sum of predicted daily amounts over the `horizon` days after `as_of`.
    ///
    /// Negative daily predictions count as zero. Every failure is reported as
    /// [`ForecastError::ForecastUnavailable`].
    pub fn forecast(
        &self,
        historical: &[ExpenseRecord],
        horizon: usize,
        as_of: NaiveDate,
    ) -> Result<f64> {
        if horizon == 0 && historical.len() >= self.min_points {
            return Ok(0.0);
        }

        let result = self
            .project(historical, horizon, as_of)
            .map_err(into_unavailable)?;
        let total = result.clamped_total();

        match result.clamped_interval() {
            Some((lo, hi)) => info!(
                "{} projects {:.2} over {} days ({:.2} to {:.2})",
                self.model.name(),
                total,
                horizon,
                lo,
                hi
            ),
            None => info!(
                "{} projects {:.2} over {} days",
                self.model.name(),
                total,
                horizon
            ),
        }

        Ok(total)
    }
}

fn into_unavailable(err: ForecastError) -> ForecastError {
    match err {
        ForecastError::ForecastUnavailable(_) => err,
        other => ForecastError::ForecastUnavailable(other.to_string()),
    }
}
