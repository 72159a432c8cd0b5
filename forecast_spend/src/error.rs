//! Error types for the forecast_spend crate

use polars::prelude::PolarsError;
use spend_math::MathError;
use thiserror::Error;

/// Custom error types for the forecast_spend crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request payload is not a JSON array of expense records
    #[error("Input format error: {0}")]
    InputFormat(String),

    /// A record date is neither `YYYY-MM-DD` nor an ISO-8601 timestamp
    #[error("Malformed date: {0:?}")]
    MalformedDate(String),

    /// The forecaster could not be fitted or could not predict
    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(String),

    /// The supplementary historical file is absent or unreadable
    #[error("Historical file unavailable: {0}")]
    MissingHistoricalFile(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A holiday calendar could not be attached to the model
    #[error("Holiday calendar unavailable: {0}")]
    HolidaysUnavailable(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from the numerical core
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
