//! Shared fixtures and forecast model doubles
#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use forecast_spend::{
    DailySeries, ExpenseRecord, ForecastError, ForecastModel, ForecastResult, Result,
    TrainedForecastModel,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn record(date_str: &str, category: &str, amount: f64) -> ExpenseRecord {
    ExpenseRecord::new(
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        category,
        amount,
    )
}

/// `days` consecutive daily records ending the day before `end`
pub fn daily_history(category: &str, end: NaiveDate, days: i64, amount: f64) -> Vec<ExpenseRecord> {
    (1..=days)
        .rev()
        .map(|offset| ExpenseRecord::new(end - Duration::days(offset), category, amount))
        .collect()
}

/// Predicts the same amount every day
#[derive(Debug, Clone)]
pub struct ConstantModel {
    pub daily: f64,
    /// Training fails when any observation exceeds this amount
    pub fail_above: Option<f64>,
}

impl ConstantModel {
    pub fn new(daily: f64) -> Self {
        Self {
            daily,
            fail_above: None,
        }
    }

    pub fn failing_above(daily: f64, limit: f64) -> Self {
        Self {
            daily,
            fail_above: Some(limit),
        }
    }
}

#[derive(Debug)]
pub struct TrainedConstant {
    daily: f64,
}

impl ForecastModel for ConstantModel {
    type Trained = TrainedConstant;

    fn train(&self, data: &DailySeries) -> Result<TrainedConstant> {
        if let Some(limit) = self.fail_above {
            if data.values()?.iter().any(|v| *v > limit) {
                return Err(ForecastError::DataError(format!(
                    "observation above {}",
                    limit
                )));
            }
        }
        Ok(TrainedConstant { daily: self.daily })
    }

    fn name(&self) -> &str {
        "constant"
    }
}

impl TrainedForecastModel for TrainedConstant {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult> {
        ForecastResult::new(dates.to_vec(), vec![self.daily; dates.len()])
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Panics if it is ever trained
#[derive(Debug, Clone)]
pub struct PanickingModel;

impl ForecastModel for PanickingModel {
    type Trained = TrainedConstant;

    fn train(&self, _data: &DailySeries) -> Result<TrainedConstant> {
        panic!("forecaster invoked")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}
