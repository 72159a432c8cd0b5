//! The prediction period: reference date and remaining days in its month

use crate::records::ExpenseRecord;
use chrono::{Datelike, NaiveDate};

/// Last calendar day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Number of days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    last_day_of_month(date).day()
}

/// Month containing the reference date, seen from that date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePeriod {
    reference_date: NaiveDate,
}

impl ReferencePeriod {
    /// Anchor the period at an explicit date
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Anchor at the latest record date, or at `today` when there are no records
    pub fn from_records(records: &[ExpenseRecord], today: NaiveDate) -> Self {
        let reference_date = records.iter().map(|r| r.date).max().unwrap_or(today);
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.reference_date)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.reference_date)
    }

    /// Days left after the reference date; zero on the last day of the month
    pub fn remaining_days(&self) -> u32 {
        let days = (self.last_day() - self.reference_date).num_days();
        days.max(0) as u32
    }

    /// Fraction of the month elapsed at the reference date, in (0, 1]
    pub fn month_progress(&self) -> f64 {
        self.reference_date.day() as f64 / self.days_in_month() as f64
    }
}
