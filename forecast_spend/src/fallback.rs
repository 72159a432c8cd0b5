//! Arithmetic projection used when there is too little history to forecast

use crate::category::CategoryKind;
use crate::features::{days_elapsed, distinct_days, total};
use crate::records::ExpenseRecord;
use tracing::debug;

/// Share of the current bills total expected to arrive before month end
pub const BILLS_ADDITIONAL_SHARE: f64 = 0.2;
/// Share of the current education total expected to arrive before month end
pub const EDUCATION_ADDITIONAL_SHARE: f64 = 0.3;
/// Damping applied to the linear extrapolation for every other category
pub const EXTRAPOLATION_DAMPING: f64 = 0.8;

/// Fallback estimator over the current period's records only
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackEstimator;

impl FallbackEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the month-end total for `category`.
    ///
    /// With no remaining days the current total is returned unchanged.
    pub fn estimate(&self, current: &[ExpenseRecord], category: &str, remaining_days: i64) -> f64 {
        let current_total = total(current);
        if remaining_days <= 0 {
            return current_total;
        }

        let days_with_spending = distinct_days(current);
        let days_elapsed = days_elapsed(current);
        let spending_frequency = days_with_spending as f64 / days_elapsed.max(1) as f64;
        let daily_average = current_total / days_with_spending.max(1) as f64;

        let additional = match CategoryKind::classify(category) {
            CategoryKind::Bills => current_total * BILLS_ADDITIONAL_SHARE,
            CategoryKind::Education => current_total * EDUCATION_ADDITIONAL_SHARE,
            _ => {
                daily_average * remaining_days as f64 * spending_frequency * EXTRAPOLATION_DAMPING
            }
        };

        debug!(
            "{}: fallback daily avg {:.2}, frequency {:.2}, additional {:.2}",
            category, daily_average, spending_frequency, additional
        );

        current_total + additional.max(0.0)
    }
}
