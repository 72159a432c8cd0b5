//! Heuristic correction of raw forecaster output
//!
//! The forecaster's projection for the rest of the month is adjusted in
//! three stages, each consuming the previous stage's output:
//!
//! 1. **Velocity**: scale by a factor chosen from month progress and the
//!    current daily spending rate. Early, fast spending is trusted to
//!    continue; late-month tails are compressed.
//! 2. **Ceiling**: cap the additional amount at
//!    `daily_average * category_multiplier * remaining_days`.
//! 3. **Floor**: the total never drops below what has already been spent.

use crate::category::CategoryKind;
use crate::error::{ForecastError, Result};
use crate::features::DerivedFeatures;
use tracing::debug;

/// Velocity factor for a month progress and daily spending rate
pub fn velocity_factor(month_progress: f64, daily_average: f64) -> f64 {
    if month_progress < 0.2 {
        if daily_average > 30.0 {
            1.3
        } else {
            1.1
        }
    } else if month_progress < 0.6 {
        if daily_average > 20.0 {
            1.0
        } else {
            0.9
        }
    } else if daily_average > 15.0 {
        0.8
    } else {
        0.6
    }
}

/// Multiple of the daily average a category may add per remaining day
pub fn ceiling_multiplier(kind: CategoryKind) -> f64 {
    match kind {
        CategoryKind::Bills => 0.3,
        CategoryKind::Education => 0.2,
        CategoryKind::Food | CategoryKind::Transport => 1.5,
        CategoryKind::Shopping | CategoryKind::Entertainment => 1.0,
        CategoryKind::Other => 0.8,
    }
}

/// Largest additional amount a category may add before month end
pub fn additional_ceiling(kind: CategoryKind, daily_average: f64, remaining_days: i64) -> f64 {
    daily_average * ceiling_multiplier(kind) * remaining_days.max(0) as f64
}

/// Outcome of a correction, with the intermediate values for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub velocity_factor: f64,
    /// Additional amount after the velocity stage
    pub adjusted_additional: f64,
    /// Cap on the additional amount
    pub ceiling: f64,
    /// The ceiling was applied
    pub capped: bool,
    /// The floor was applied
    pub floored: bool,
    pub predicted_total: f64,
}

/// Velocity-table correction engine
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCorrector;

impl HeuristicCorrector {
    pub fn new() -> Self {
        Self
    }

    /// Correct a raw forecast of the additional spend for the rest of the month
    pub fn correct(
        &self,
        raw_additional: f64,
        current_total: f64,
        category: CategoryKind,
        features: &DerivedFeatures,
        remaining_days: i64,
    ) -> Result<Correction> {
        if remaining_days < 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "remaining days must not be negative, got {}",
                remaining_days
            )));
        }
        if !raw_additional.is_finite() || !current_total.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "forecast and current total must be finite".to_string(),
            ));
        }

        let factor = velocity_factor(features.month_progress, features.daily_average);
        let adjusted_additional = raw_additional * factor;

        let ceiling = additional_ceiling(category, features.daily_average, remaining_days);
        let capped = adjusted_additional > ceiling;
        let capped_additional = adjusted_additional.min(ceiling);

        let mut predicted_total = current_total + capped_additional;
        let floored = predicted_total < current_total;
        if floored {
            predicted_total = current_total;
        }

        debug!(
            "{}: velocity factor {:.2}, additional {:.2} -> {:.2}, ceiling {:.2}{}{}",
            category,
            factor,
            raw_additional,
            adjusted_additional,
            ceiling,
            if capped { ", capped" } else { "" },
            if floored { ", floored at current total" } else { "" },
        );

        Ok(Correction {
            velocity_factor: factor,
            adjusted_additional,
            ceiling,
            capped,
            floored,
            predicted_total,
        })
    }
}
