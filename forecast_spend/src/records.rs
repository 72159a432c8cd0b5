//! Expense records: parsing, date normalisation and grouping

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A single dated, categorised expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    /// Calendar date of the expense
    pub date: NaiveDate,
    /// Category name, compared case-sensitively when grouping
    pub category: String,
    /// Amount spent (non-negative)
    pub amount: f64,
}

impl ExpenseRecord {
    /// Create a new expense record
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            category: category.into(),
            amount,
        }
    }
}

/// Record shape as it arrives on the wire. Unknown fields such as `user_id`
/// are ignored.
#[derive(Debug, Deserialize)]
struct WireRecord {
    date: String,
    category: String,
    amount: f64,
}

/// What to do with a record that cannot be normalised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordPolicy {
    /// Any bad record fails the whole batch
    #[default]
    Strict,
    /// Bad records are dropped with a warning
    SkipInvalid,
}

/// Parse a record date.
///
/// Accepts a bare `YYYY-MM-DD` date or an ISO-8601 timestamp. A `Z` suffix or
/// explicit offset is accepted and dropped: the wall-clock date is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let value = raw.trim();

    if value.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.naive_local().date());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(dt.date());
            }
        }
        return Err(ForecastError::MalformedDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ForecastError::MalformedDate(raw.to_string()))
}

/// Format a date the way the extraction tool writes it (`YYYY-MM-DD`)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a date as a UTC midnight timestamp (`YYYY-MM-DDT00:00:00Z`)
pub fn format_timestamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00Z").to_string()
}

fn normalise(value: serde_json::Value) -> Result<ExpenseRecord> {
    let wire: WireRecord = serde_json::from_value(value)
        .map_err(|e| ForecastError::InputFormat(format!("invalid expense record: {}", e)))?;

    if !(wire.amount.is_finite() && wire.amount >= 0.0) {
        return Err(ForecastError::InputFormat(format!(
            "amount must be a non-negative number, got {}",
            wire.amount
        )));
    }

    Ok(ExpenseRecord {
        date: parse_date(&wire.date)?,
        category: wire.category,
        amount: wire.amount,
    })
}

/// Parse a JSON array of `{date, category, amount}` objects
pub fn parse_records(json: &str, policy: RecordPolicy) -> Result<Vec<ExpenseRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| ForecastError::InputFormat(format!("expected a JSON array: {}", e)))?;

    let mut records = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match normalise(value) {
            Ok(record) => records.push(record),
            Err(e) if policy == RecordPolicy::SkipInvalid => {
                warn!("Skipping record {}: {}", idx, e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}

/// Load the supplementary historical file.
///
/// An absent or unreadable file is reported as
/// [`ForecastError::MissingHistoricalFile`]; callers treat it as empty history.
pub fn load_historical<P: AsRef<Path>>(path: P, policy: RecordPolicy) -> Result<Vec<ExpenseRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        ForecastError::MissingHistoricalFile(format!("{}: {}", path.display(), e))
    })?;

    let records = parse_records(&contents, policy)?;
    debug!("Loaded {} historical records from {}", records.len(), path.display());
    Ok(records)
}

/// Group records by category, preserving input order within each group
pub fn group_by_category(records: &[ExpenseRecord]) -> BTreeMap<String, Vec<ExpenseRecord>> {
    let mut groups: BTreeMap<String, Vec<ExpenseRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.category.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}
