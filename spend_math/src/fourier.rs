//! Fourier series terms for periodic (seasonal) components
//!
//! A seasonal effect with period `P` is approximated by a truncated Fourier
//! series of order `N`:
//!
//! `s(t) = sum_{n=1..N} a_n * sin(2*pi*n*t / P) + b_n * cos(2*pi*n*t / P)`
//!
//! This module only produces the `2N` regressor values for a given `t`; the
//! coefficients are estimated by the caller.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A truncated Fourier series with a fixed period and order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierSeries {
    period: f64,
    order: usize,
}

impl FourierSeries {
    /// Create a new Fourier series with the specified period (in days) and order
    pub fn new(period: f64, order: usize) -> Result<Self> {
        if !(period.is_finite() && period > 0.0) {
            return Err(MathError::InvalidInput(
                "Period must be a positive, finite number of days".to_string(),
            ));
        }
        if order == 0 {
            return Err(MathError::InvalidInput(
                "Fourier order must be at least 1".to_string(),
            ));
        }

        Ok(Self { period, order })
    }

    /// Number of regressor columns produced per observation
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Regressor values at time `t` (days since an arbitrary epoch).
    ///
    /// Values are laid out as `[sin_1, cos_1, sin_2, cos_2, ...]`.
    pub fn features(&self, t: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        for n in 1..=self.order {
            let angle = 2.0 * PI * n as f64 * t / self.period;
            out.push(angle.sin());
            out.push(angle.cos());
        }
        out
    }
}
