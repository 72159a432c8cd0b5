//! Daily-indexed series handed to the forecaster

use crate::error::{ForecastError, Result};
use crate::records::ExpenseRecord;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Name of the date column (days from the common era)
pub const DATE_COLUMN: &str = "ds";
/// Name of the value column
pub const VALUE_COLUMN: &str = "y";

/// Time series of dated amounts, sorted by date.
///
/// Same-day observations are kept as separate rows; nothing is aggregated.
#[derive(Debug, Clone)]
pub struct DailySeries {
    df: DataFrame,
}

impl DailySeries {
    /// Create a series from parallel date and value vectors
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Series values must be finite, got {}",
                bad
            )));
        }

        let mut rows: Vec<(NaiveDate, f64)> = dates.into_iter().zip(values).collect();
        // Stable: same-day rows keep their input order
        rows.sort_by_key(|(date, _)| *date);

        let ordinals: Vec<i64> = rows
            .iter()
            .map(|(date, _)| date.num_days_from_ce() as i64)
            .collect();
        let amounts: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();

        let df = DataFrame::new(vec![
            Series::new(DATE_COLUMN, ordinals),
            Series::new(VALUE_COLUMN, amounts),
        ])?;

        Ok(Self { df })
    }

    /// One observation per record
    pub fn from_records(records: &[ExpenseRecord]) -> Result<Self> {
        Self::new(
            records.iter().map(|r| r.date).collect(),
            records.iter().map(|r| r.amount).collect(),
        )
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Observation dates, ascending
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        self.df
            .column(DATE_COLUMN)?
            .i64()?
            .into_iter()
            .flatten()
            .map(|ordinal| {
                i32::try_from(ordinal)
                    .ok()
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .ok_or_else(|| {
                        ForecastError::DataError(format!("Day ordinal {} is out of range", ordinal))
                    })
            })
            .collect()
    }

    /// Observation values in date order
    pub fn values(&self) -> Result<Vec<f64>> {
        Ok(self
            .df
            .column(VALUE_COLUMN)?
            .f64()?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Number of distinct dates in the series
    pub fn distinct_dates(&self) -> Result<usize> {
        let mut dates = self.dates()?;
        dates.dedup();
        Ok(dates.len())
    }

    /// Days between the first and last observation
    pub fn span_days(&self) -> Result<i64> {
        let dates = self.dates()?;
        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => Ok((*last - *first).num_days()),
            _ => Ok(0),
        }
    }
}
