//! # Forecast Spend
//!
//! Month-end spending projection per expense category.
//!
//! ## Pipeline
//!
//! - Expense records parsed from JSON (`YYYY-MM-DD` or ISO-8601 dates)
//! - Reference period anchored at the latest expense date
//! - Additive seasonal-trend forecaster (trend with change points, Fourier
//!   seasonalities, holiday regressors) projecting the rest of the month
//! - Velocity-table correction with per-category ceilings and a floor at the
//!   amount already spent
//! - Arithmetic fallback when history is too short or forecasting fails
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_spend::{PredictorConfig, Predictor};
//! use chrono::NaiveDate;
//!
//! let predictor = Predictor::new(PredictorConfig::default())?;
//! let today = NaiveDate::from_ymd_opt(2025, 7, 17).unwrap();
//! let prediction = predictor.run(
//!     r#"[{"date": "2025-07-17", "category": "Food", "amount": 30.0}]"#,
//!     today,
//! )?;
//! println!("{}", prediction.to_json_line());
//! # Ok::<(), forecast_spend::ForecastError>(())
//! ```

pub mod adapter;
pub mod category;
pub mod config;
pub mod data;
pub mod error;
pub mod fallback;
pub mod features;
pub mod heuristics;
pub mod models;
pub mod period;
pub mod predictor;
pub mod records;

pub use adapter::{ForecastAdapter, MIN_FORECAST_POINTS};
pub use category::CategoryKind;
pub use config::{ForecasterConfig, Growth, PredictorConfig, SeasonalityMode};
pub use data::DailySeries;
pub use error::{ForecastError, Result};
pub use fallback::FallbackEstimator;
pub use features::{DerivedFeatures, PatternFlags};
pub use heuristics::{Correction, HeuristicCorrector};
pub use models::{
    AdditiveModel, ForecastModel, ForecastResult, HolidayCalendar, TrainedAdditiveModel,
    TrainedForecastModel,
};
pub use period::ReferencePeriod;
pub use predictor::{
    CategoryOutcome, CategoryPrediction, Prediction, PredictionReport, Predictor,
};
pub use records::{ExpenseRecord, RecordPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
