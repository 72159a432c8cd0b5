//! Prediction orchestrator
//!
//! Runs the whole pipeline for one payload: parse the current-period records,
//! load the supplementary history, anchor the reference period, then estimate
//! every category independently. A category with enough history is forecast
//! and corrected; otherwise, or when forecasting fails, the fallback estimator
//! is used. One category's failure never touches another's value.

use crate::adapter::ForecastAdapter;
use crate::category::CategoryKind;
use crate::config::PredictorConfig;
use crate::error::{ForecastError, Result};
use crate::fallback::FallbackEstimator;
use crate::features::DerivedFeatures;
use crate::heuristics::HeuristicCorrector;
use crate::models::{AdditiveModel, ForecastModel};
use crate::period::ReferencePeriod;
use crate::records::{group_by_category, load_historical, parse_records, ExpenseRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// How a category's total was produced
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    /// Forecast, then heuristically corrected
    Forecasted {
        raw_additional: f64,
        velocity_factor: f64,
        capped: bool,
        total: f64,
    },
    /// Too little history; fallback estimator used directly
    Fallback { total: f64 },
    /// Forecasting failed; fallback estimator used instead
    Failed { reason: String, total: f64 },
}

impl CategoryOutcome {
    /// Unrounded predicted total
    pub fn total(&self) -> f64 {
        match self {
            CategoryOutcome::Forecasted { total, .. }
            | CategoryOutcome::Fallback { total }
            | CategoryOutcome::Failed { total, .. } => *total,
        }
    }
}

/// Prediction for one category, with what it was derived from
#[derive(Debug, Clone)]
pub struct CategoryPrediction {
    pub category: String,
    pub kind: CategoryKind,
    pub features: DerivedFeatures,
    pub historical_points: usize,
    pub outcome: CategoryOutcome,
}

/// All category predictions for one reference period
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub period: ReferencePeriod,
    pub categories: Vec<CategoryPrediction>,
}

impl PredictionReport {
    pub fn forecasted_count(&self) -> usize {
        self.count(|o| matches!(o, CategoryOutcome::Forecasted { .. }))
    }

    pub fn fallback_count(&self) -> usize {
        self.count(|o| matches!(o, CategoryOutcome::Fallback { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, CategoryOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&CategoryOutcome) -> bool) -> usize {
        self.categories.iter().filter(|c| pred(&c.outcome)).count()
    }

    /// Category totals rounded to cents
    pub fn to_prediction(&self) -> Prediction {
        Prediction(
            self.categories
                .iter()
                .map(|c| (c.category.clone(), round_cents(c.outcome.total())))
                .collect(),
        )
    }
}

/// Category name to predicted month-end total.
///
/// An empty prediction means "no prediction available", not "zero spend".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Prediction(BTreeMap<String, f64>);

impl Prediction {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Single-line JSON object
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Round to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Month-end spending predictor
#[derive(Debug, Clone)]
pub struct Predictor<M: ForecastModel = AdditiveModel> {
    config: PredictorConfig,
    adapter: ForecastAdapter<M>,
    corrector: HeuristicCorrector,
    fallback: FallbackEstimator,
}

impl Predictor<AdditiveModel> {
    /// Predictor backed by the additive seasonal-trend forecaster
    pub fn new(config: PredictorConfig) -> Result<Self> {
        let adapter = ForecastAdapter::additive(&config.forecaster, config.min_history_points)?;
        Ok(Self::with_adapter(config, adapter))
    }
}

impl<M: ForecastModel> Predictor<M> {
    /// Predictor backed by an arbitrary forecast model
    pub fn with_model(config: PredictorConfig, model: M) -> Self {
        let adapter = ForecastAdapter::new(model, config.min_history_points);
        Self::with_adapter(config, adapter)
    }

    fn with_adapter(config: PredictorConfig, adapter: ForecastAdapter<M>) -> Self {
        Self {
            config,
            adapter,
            corrector: HeuristicCorrector::new(),
            fallback: FallbackEstimator::new(),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Supplementary history from the configured file; empty when it cannot be used
    pub fn load_supplementary(&self) -> Vec<ExpenseRecord> {
        match load_historical(&self.config.history_path, self.config.record_policy) {
            Ok(records) => records,
            Err(e @ ForecastError::MissingHistoricalFile(_)) => {
                warn!("{}; continuing without supplementary history", e);
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "Ignoring historical file {}: {}",
                    self.config.history_path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Predict every category present in `current`.
    ///
    /// `today` anchors the period only when `current` is empty.
    pub fn predict(
        &self,
        current: &[ExpenseRecord],
        supplementary: &[ExpenseRecord],
        today: NaiveDate,
    ) -> PredictionReport {
        let period = ReferencePeriod::from_records(current, today);
        info!(
            "Reference date {}, {} days remaining in month",
            period.reference_date(),
            period.remaining_days()
        );

        let history_by_category = group_by_category(supplementary);
        let categories = group_by_category(current)
            .into_iter()
            .map(|(category, records)| {
                let extra = history_by_category
                    .get(&category)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                self.predict_category(category, &records, extra, &period)
            })
            .collect();

        let report = PredictionReport { period, categories };
        info!(
            "Predicted {} categories: {} forecasted, {} fallback, {} failed over to fallback",
            report.categories.len(),
            report.forecasted_count(),
            report.fallback_count(),
            report.failed_count()
        );
        report
    }

    fn predict_category(
        &self,
        category: String,
        current: &[ExpenseRecord],
        supplementary: &[ExpenseRecord],
        period: &ReferencePeriod,
    ) -> CategoryPrediction {
        let kind = CategoryKind::classify(&category);
        let remaining_days = period.remaining_days() as i64;

        let mut historical = current.to_vec();
        historical.extend_from_slice(supplementary);

        let features = DerivedFeatures::compute(kind, current, &historical, period);
        debug!(
            "{}: total {:.2} over {} days, daily avg {:.2}, frequency {:.2}, patterns {:?}",
            category,
            features.current_total,
            features.days_with_spending,
            features.daily_average,
            features.spending_frequency,
            features.patterns
        );

        let outcome = if historical.len() < self.adapter.min_points() {
            let total = self.fallback.estimate(current, &category, remaining_days);
            info!(
                "{}: {} historical points, using fallback -> {:.2}",
                category,
                historical.len(),
                total
            );
            CategoryOutcome::Fallback { total }
        } else {
            self.forecast_category(&category, kind, &features, &historical, current, period)
        };

        CategoryPrediction {
            category,
            kind,
            features,
            historical_points: historical.len(),
            outcome,
        }
    }

    fn forecast_category(
        &self,
        category: &str,
        kind: CategoryKind,
        features: &DerivedFeatures,
        historical: &[ExpenseRecord],
        current: &[ExpenseRecord],
        period: &ReferencePeriod,
    ) -> CategoryOutcome {
        let remaining_days = period.remaining_days() as i64;

        let corrected = self
            .adapter
            .forecast(
                historical,
                period.remaining_days() as usize,
                period.reference_date(),
            )
            .and_then(|raw| {
                self.corrector
                    .correct(raw, features.current_total, kind, features, remaining_days)
                    .map(|correction| (raw, correction))
            });

        match corrected {
            Ok((raw_additional, correction)) => {
                info!(
                    "{}: forecast +{:.2}, corrected total {:.2}",
                    category, raw_additional, correction.predicted_total
                );
                CategoryOutcome::Forecasted {
                    raw_additional,
                    velocity_factor: correction.velocity_factor,
                    capped: correction.capped,
                    total: correction.predicted_total,
                }
            }
            Err(e) => {
                let total = self.fallback.estimate(current, category, remaining_days);
                warn!("{}: {}; using fallback -> {:.2}", category, e, total);
                CategoryOutcome::Failed {
                    reason: e.to_string(),
                    total,
                }
            }
        }
    }

    /// Parse a payload, load supplementary history and predict
    pub fn run(&self, input: &str, today: NaiveDate) -> Result<Prediction> {
        let current = parse_records(input, self.config.record_policy)?;
        debug!("Parsed {} current-period records", current.len());
        if current.is_empty() {
            return Ok(Prediction::empty());
        }

        let supplementary = self.load_supplementary();
        let report = self.predict(&current, &supplementary, today);

        // JSON has no encoding for infinity or NaN
        if let Some(bad) = report
            .categories
            .iter()
            .find(|c| !c.outcome.total().is_finite())
        {
            return Err(ForecastError::InputFormat(format!(
                "total for {} is not a finite number",
                bad.category
            )));
        }
        Ok(report.to_prediction())
    }

    /// Like [`Predictor::run`], degrading any failure to an empty prediction
    pub fn run_or_empty(&self, input: &str, today: NaiveDate) -> Prediction {
        self.run(input, today).unwrap_or_else(|e| {
            warn!("Prediction failed: {}", e);
            Prediction::empty()
        })
    }
}
