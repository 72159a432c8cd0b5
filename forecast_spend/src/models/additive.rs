//! Additive seasonal-trend forecaster
//!
//! The model decomposes a daily series into a piecewise-linear trend `g(t)`,
//! Fourier seasonalities and holiday indicators, collected in `X_s`:
//!
//! - additive mode: `y = g(t) + X_s b`
//! - multiplicative mode: `y = g(t) * (1 + X_s b)`
//!
//! Parameters are fitted as a penalised (MAP) estimate. Gaussian priors on the
//! trend level, slope, seasonal and holiday coefficients become ridge
//! penalties; the Laplace prior on change-point slope adjustments is handled
//! by iteratively reweighted ridge penalties. In multiplicative mode the trend
//! and seasonal blocks are solved alternately, each one linear given the other.

use crate::config::{ForecasterConfig, Growth, SeasonalityMode};
use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::holidays::HolidayCalendar;
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use chrono::{Datelike, NaiveDate};
use spend_math::{DMatrix, DVector, FourierSeries, PenalizedLeastSquares, PiecewiseLinearTrend};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use std::collections::BTreeSet;
use tracing::debug;

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
/// Standard deviation of the Gaussian prior on trend level and slope
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Smallest residual scale, in scaled units
const MIN_SIGMA: f64 = 0.05;
/// Smallest |delta| used when reweighting the Laplace prior
const LAPLACE_EPSILON: f64 = 1e-4;
/// Slope penalty that pins the trend flat
const FLAT_SLOPE_PENALTY: f64 = 1e9;
/// Columns whose range over the history is below this are dropped
const CONSTANT_COLUMN_TOLERANCE: f64 = 1e-8;

const MODEL_NAME: &str = "Additive seasonal-trend";

/// Additive seasonal-trend forecaster (untrained)
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    config: ForecasterConfig,
    holidays: Option<HolidayCalendar>,
}

impl AdditiveModel {
    /// Create a new model from its configuration
    pub fn new(config: ForecasterConfig) -> Result<Self> {
        if !(config.interval_width > 0.0 && config.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval width must be in (0, 1), got {}",
                config.interval_width
            )));
        }
        if !(config.changepoint_range > 0.0 && config.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "change-point range must be in (0, 1], got {}",
                config.changepoint_range
            )));
        }
        for (name, scale) in [
            ("change-point", config.changepoint_prior_scale),
            ("seasonality", config.seasonality_prior_scale),
            ("holidays", config.holidays_prior_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} prior scale must be positive, got {}",
                    name, scale
                )));
            }
        }
        if config.max_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "max iterations must be at least 1".to_string(),
            ));
        }
        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                config.tolerance
            )));
        }

        Ok(Self {
            config,
            holidays: None,
        })
    }

    /// Attach a holiday calendar used as additional regressors
    pub fn with_holidays(mut self, calendar: HolidayCalendar) -> Self {
        self.holidays = Some(calendar);
        self
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    pub fn holidays(&self) -> Option<&HolidayCalendar> {
        self.holidays.as_ref()
    }

    fn seasonalities(&self) -> Result<Vec<FourierSeries>> {
        let mut out = Vec::new();
        let wanted = [
            (self.config.daily_seasonality, 1.0, self.config.daily_order),
            (self.config.weekly_seasonality, 7.0, self.config.weekly_order),
            (self.config.yearly_seasonality, 365.25, self.config.yearly_order),
        ];
        for (enabled, period, order) in wanted {
            if enabled {
                out.push(FourierSeries::new(period, order)?);
            }
        }
        Ok(out)
    }
}

/// Regressors beyond the trend: seasonal Fourier terms then holiday indicators
#[derive(Debug, Clone)]
struct SeasonalDesign {
    seasonalities: Vec<FourierSeries>,
    holidays: Option<HolidayCalendar>,
    /// Holidays observed in the history, one indicator column each
    holiday_names: Vec<&'static str>,
    /// Indices of the full row kept after dropping constant columns
    active: Vec<usize>,
    /// Number of leading active columns that are seasonal (the rest are holidays)
    seasonal_columns: usize,
}

impl SeasonalDesign {
    fn build(
        seasonalities: Vec<FourierSeries>,
        holidays: Option<HolidayCalendar>,
        dates: &[NaiveDate],
    ) -> Self {
        let holiday_names: Vec<&'static str> = match &holidays {
            Some(calendar) => dates
                .iter()
                .filter_map(|d| calendar.holiday_on(*d))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => Vec::new(),
        };

        let mut design = Self {
            seasonalities,
            holidays,
            holiday_names,
            active: Vec::new(),
            seasonal_columns: 0,
        };

        let rows: Vec<Vec<f64>> = dates.iter().map(|d| design.full_row(*d)).collect();
        let fourier_width: usize = design.seasonalities.iter().map(|s| s.width()).sum();
        let total_width = fourier_width + design.holiday_names.len();

        for col in 0..total_width {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r[col]), hi.max(r[col]))
            });
            if hi - lo > CONSTANT_COLUMN_TOLERANCE {
                design.active.push(col);
                if col < fourier_width {
                    design.seasonal_columns += 1;
                }
            }
        }

        design
    }

    fn full_row(&self, date: NaiveDate) -> Vec<f64> {
        let t = (date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) as f64;
        let mut row: Vec<f64> = self
            .seasonalities
            .iter()
            .flat_map(|s| s.features(t))
            .collect();

        let holiday = self.holidays.as_ref().and_then(|c| c.holiday_on(date));
        row.extend(
            self.holiday_names
                .iter()
                .map(|name| if Some(*name) == holiday { 1.0 } else { 0.0 }),
        );
        row
    }

    fn row(&self, date: NaiveDate) -> Vec<f64> {
        let full = self.full_row(date);
        self.active.iter().map(|&col| full[col]).collect()
    }

    fn width(&self) -> usize {
        self.active.len()
    }
}

/// Trained additive seasonal-trend model
#[derive(Debug, Clone)]
pub struct TrainedAdditiveModel {
    mode: SeasonalityMode,
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    trend: PiecewiseLinearTrend,
    trend_coefficients: Vec<f64>,
    seasonal: SeasonalDesign,
    seasonal_coefficients: Vec<f64>,
    /// Residual scale, in scaled units
    sigma: f64,
    /// Normal quantile for the configured interval width
    z: f64,
}

impl TrainedAdditiveModel {
    /// Holidays that entered the fit as regressors
    pub fn holiday_names(&self) -> &[&'static str] {
        &self.seasonal.holiday_names
    }

    /// Residual standard deviation in data units
    pub fn residual_scale(&self) -> f64 {
        self.sigma * self.y_scale
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn point(&self, date: NaiveDate) -> Result<f64> {
        let g = self
            .trend
            .evaluate(&self.trend_coefficients, self.scaled_time(date))?;
        let s: f64 = self
            .seasonal
            .row(date)
            .iter()
            .zip(&self.seasonal_coefficients)
            .map(|(x, b)| x * b)
            .sum();

        let yhat = match self.mode {
            SeasonalityMode::Additive => g + s,
            SeasonalityMode::Multiplicative => g * (1.0 + s),
        };
        Ok(yhat * self.y_scale)
    }
}

impl TrainedForecastModel for TrainedAdditiveModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastResult> {
        let values = dates
            .iter()
            .map(|d| self.point(*d))
            .collect::<Result<Vec<f64>>>()?;

        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::ForecastUnavailable(format!(
                "prediction is not finite ({})",
                bad
            )));
        }

        let margin = self.z * self.sigma * self.y_scale;
        let intervals = values.iter().map(|v| (v - margin, v + margin)).collect();

        ForecastResult::new_with_intervals(dates.to_vec(), values, intervals)
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

impl ForecastModel for AdditiveModel {
    type Trained = TrainedAdditiveModel;

    fn train(&self, data: &DailySeries) -> Result<Self::Trained> {
        let dates = data.dates()?;
        let values = data.values()?;

        let (start, end) = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(ForecastError::ForecastUnavailable(
                    "cannot fit an empty series".to_string(),
                ))
            }
        };
        let span_days = (end - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(ForecastError::ForecastUnavailable(format!(
                "all {} observations fall on {}",
                dates.len(),
                start
            )));
        }

        let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };
        let ys = DVector::from_iterator(values.len(), values.iter().map(|v| v / y_scale));
        let times: Vec<f64> = dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();

        let trend = match self.config.growth {
            Growth::Linear => PiecewiseLinearTrend::place(
                &times,
                self.config.n_changepoints,
                self.config.changepoint_range,
            )?,
            Growth::Flat => PiecewiseLinearTrend::new(Vec::new())?,
        };
        let seasonal = SeasonalDesign::build(self.seasonalities()?, self.holidays.clone(), &dates);

        let trend_rows: Vec<Vec<f64>> = times.iter().map(|&t| trend.design_row(t)).collect();
        let seasonal_rows: Vec<Vec<f64>> = dates.iter().map(|d| seasonal.row(*d)).collect();
        let trend_x = DMatrix::from_fn(trend_rows.len(), trend.width(), |i, j| trend_rows[i][j]);
        let seasonal_x =
            DMatrix::from_fn(seasonal_rows.len(), seasonal.width(), |i, j| seasonal_rows[i][j]);

        debug!(
            "Fitting {} on {} points over {} days: {} change points, {} seasonal and {} holiday columns",
            MODEL_NAME,
            ys.len(),
            span_days,
            trend.changepoints().len(),
            seasonal.seasonal_columns,
            seasonal.width() - seasonal.seasonal_columns
        );

        let fit = Fit {
            config: &self.config,
            ys: &ys,
            trend_x: &trend_x,
            seasonal_x: &seasonal_x,
            seasonal_columns: seasonal.seasonal_columns,
        }
        .run()?;

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(format!("normal distribution: {}", e)))?;
        let z = normal.inverse_cdf(0.5 + self.config.interval_width / 2.0);

        debug!(
            "{} fit: {} iterations (converged: {}), sigma {:.4}",
            MODEL_NAME,
            fit.iterations,
            fit.converged,
            fit.sigma * y_scale
        );

        Ok(TrainedAdditiveModel {
            mode: self.config.seasonality_mode,
            start,
            span_days,
            y_scale,
            trend,
            trend_coefficients: fit.trend,
            seasonal,
            seasonal_coefficients: fit.seasonal,
            sigma: fit.sigma,
            z,
        })
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }
}

/// Inputs of one MAP fit, all in scaled units
struct Fit<'a> {
    config: &'a ForecasterConfig,
    ys: &'a DVector<f64>,
    trend_x: &'a DMatrix<f64>,
    seasonal_x: &'a DMatrix<f64>,
    seasonal_columns: usize,
}

struct FitOutcome {
    trend: Vec<f64>,
    seasonal: Vec<f64>,
    sigma: f64,
    iterations: usize,
    converged: bool,
}

impl Fit<'_> {
    fn run(&self) -> Result<FitOutcome> {
        let n = self.ys.len();
        let trend_width = self.trend_x.ncols();
        let seasonal_width = self.seasonal_x.ncols();
        let tau = self.config.changepoint_prior_scale;

        let mut trend = DVector::from_fn(trend_width, |i, _| if i < 2 { 0.0 } else { tau });
        let mut seasonal: DVector<f64> = DVector::zeros(seasonal_width);
        let mut sigma = self.ys.iter().population_std_dev().max(MIN_SIGMA);
        if !sigma.is_finite() {
            sigma = MIN_SIGMA;
        }

        let mut converged = false;
        let mut iterations = 0;

        for _ in 0..self.config.max_iterations {
            iterations += 1;
            let variance = sigma * sigma;

            // Trend block given the seasonal block
            let seasonal_effect = self.seasonal_x * &seasonal;
            let penalties = self.trend_penalties(trend.as_slice(), variance);
            let solver = PenalizedLeastSquares::new(penalties)?;
            let new_trend = match self.config.seasonality_mode {
                SeasonalityMode::Additive => {
                    solver.solve(self.trend_x, &(self.ys - &seasonal_effect))?
                }
                SeasonalityMode::Multiplicative => solver.solve(
                    &scale_rows(self.trend_x, &seasonal_effect.add_scalar(1.0)),
                    self.ys,
                )?,
            };

            // Seasonal block given the trend block
            let level = self.trend_x * &new_trend;
            let new_seasonal = if seasonal_width > 0 {
                let solver =
                    PenalizedLeastSquares::new(self.seasonal_penalties(seasonal_width, variance))?;
                let targets = self.ys - &level;
                match self.config.seasonality_mode {
                    SeasonalityMode::Additive => solver.solve(self.seasonal_x, &targets)?,
                    SeasonalityMode::Multiplicative => {
                        solver.solve(&scale_rows(self.seasonal_x, &level), &targets)?
                    }
                }
            } else {
                DVector::zeros(0)
            };

            if new_trend.iter().chain(new_seasonal.iter()).any(|c| !c.is_finite()) {
                return Err(ForecastError::ForecastUnavailable(
                    "fit diverged to non-finite coefficients".to_string(),
                ));
            }

            let change = max_relative_change(trend.as_slice(), new_trend.as_slice())
                .max(max_relative_change(seasonal.as_slice(), new_seasonal.as_slice()));
            trend = new_trend;
            seasonal = new_seasonal;

            let level = self.trend_x * &trend;
            let effect = self.seasonal_x * &seasonal;
            let fitted = match self.config.seasonality_mode {
                SeasonalityMode::Additive => level + effect,
                SeasonalityMode::Multiplicative => level.component_mul(&effect.add_scalar(1.0)),
            };
            let rss = (self.ys - fitted).norm_squared();
            sigma = (rss / n as f64).sqrt().max(MIN_SIGMA);

            if change < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !sigma.is_finite() {
            return Err(ForecastError::ForecastUnavailable(
                "residual scale is not finite".to_string(),
            ));
        }

        Ok(FitOutcome {
            trend: trend.iter().copied().collect(),
            seasonal: seasonal.iter().copied().collect(),
            sigma,
            iterations,
            converged,
        })
    }

    fn trend_penalties(&self, current: &[f64], variance: f64) -> Vec<f64> {
        let tau = self.config.changepoint_prior_scale;
        let gaussian = variance / (TREND_PRIOR_SCALE * TREND_PRIOR_SCALE);

        current
            .iter()
            .enumerate()
            .map(|(idx, coef)| match idx {
                0 => gaussian,
                1 if self.config.growth == Growth::Flat => FLAT_SLOPE_PENALTY,
                1 => gaussian,
                _ => variance / (tau * coef.abs().max(LAPLACE_EPSILON)),
            })
            .collect()
    }

    fn seasonal_penalties(&self, width: usize, variance: f64) -> Vec<f64> {
        let seasonal = variance / self.config.seasonality_prior_scale.powi(2);
        let holiday = variance / self.config.holidays_prior_scale.powi(2);
        (0..width)
            .map(|col| {
                if col < self.seasonal_columns {
                    seasonal
                } else {
                    holiday
                }
            })
            .collect()
    }
}

/// Multiply row `i` of `design` by `factors[i]`
fn scale_rows(design: &DMatrix<f64>, factors: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(design.nrows(), design.ncols(), |i, j| design[(i, j)] * factors[i])
}

fn max_relative_change(old: &[f64], new: &[f64]) -> f64 {
    let scale = old.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    old.iter()
        .zip(new)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
        / scale
}
