//! Piecewise-linear trend with change points
//!
//! The trend is `m + k*t + sum_j delta_j * max(t - s_j, 0)`, where `s_j` are
//! change points and `delta_j` the slope adjustment that starts at each one.
//! Coefficients are laid out as `[m, k, delta_1, ..., delta_n]`.

use crate::{MathError, Result};

/// Piecewise-linear trend defined by its change points
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearTrend {
    changepoints: Vec<f64>,
}

impl PiecewiseLinearTrend {
    /// Create a trend from explicit change points (must be finite and ascending)
    pub fn new(changepoints: Vec<f64>) -> Result<Self> {
        if changepoints.iter().any(|c| !c.is_finite()) {
            return Err(MathError::InvalidInput(
                "Change points must be finite".to_string(),
            ));
        }
        if changepoints.windows(2).any(|w| w[1] < w[0]) {
            return Err(MathError::InvalidInput(
                "Change points must be in ascending order".to_string(),
            ));
        }

        Ok(Self { changepoints })
    }

    /// Place up to `requested` change points evenly over the first `range`
    /// fraction of the (sorted) observation times.
    ///
    /// Change points are taken at observation times, so fewer are placed when
    /// the history is short. Repeated times collapse into one change point and
    /// a change point at the very first observation is dropped.
    pub fn place(times: &[f64], requested: usize, range: f64) -> Result<Self> {
        if !(range > 0.0 && range <= 1.0) {
            return Err(MathError::InvalidInput(
                "Change point range must be in (0, 1]".to_string(),
            ));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(MathError::InvalidInput(
                "Observation times must be sorted".to_string(),
            ));
        }
        if times.is_empty() {
            return Ok(Self {
                changepoints: Vec::new(),
            });
        }

        let hist_size = ((times.len() as f64) * range).floor() as usize;
        let count = if requested + 1 > hist_size {
            hist_size.saturating_sub(1)
        } else {
            requested
        };
        if count == 0 {
            return Ok(Self {
                changepoints: Vec::new(),
            });
        }

        let last_index = (hist_size - 1) as f64;
        let mut changepoints: Vec<f64> = (1..=count)
            .map(|i| {
                let idx = (last_index * i as f64 / count as f64).round() as usize;
                times[idx]
            })
            .filter(|&t| t > times[0])
            .collect();
        changepoints.dedup();

        Ok(Self { changepoints })
    }

    /// The change point locations
    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    /// Number of coefficients: intercept, slope and one delta per change point
    pub fn width(&self) -> usize {
        2 + self.changepoints.len()
    }

    /// Regressor row at time `t`
    pub fn design_row(&self, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&s| (t - s).max(0.0)));
        row
    }

    /// Evaluate the trend at time `t` for the given coefficients
    pub fn evaluate(&self, coefficients: &[f64], t: f64) -> Result<f64> {
        if coefficients.len() != self.width() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} trend coefficients, got {}",
                self.width(),
                coefficients.len()
            )));
        }

        Ok(self
            .design_row(t)
            .iter()
            .zip(coefficients)
            .map(|(x, b)| x * b)
            .sum())
    }
}
