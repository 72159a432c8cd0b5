//! Per-category features derived from current and historical records

use crate::category::CategoryKind;
use crate::period::ReferencePeriod;
use crate::records::ExpenseRecord;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashMap};

/// Share of records on a single weekday above which spending counts as clustered
const WEEKDAY_CLUSTER_SHARE: f64 = 0.3;
/// Share of weekend records at or above which a category is weekend-heavy
const WEEKEND_HEAVY_SHARE: f64 = 0.4;
/// Share of the current total one payment must exceed to count as large
const LARGE_PAYMENT_SHARE: f64 = 0.5;
/// Share of bill records after `LATE_MONTH_DAY` needed for the late-month pattern
const LATE_BILL_SHARE: f64 = 0.7;
const LATE_MONTH_DAY: u32 = 20;

/// Structural spending patterns detected for a category
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatternFlags {
    /// Weekday holding more than 30% of historical records, if any
    pub clustered_weekday: Option<Weekday>,
    /// At least 40% of historical records fall on Saturday or Sunday
    pub weekend_heavy: bool,
    /// One current record exceeds half the current total
    pub large_single_payment: bool,
    /// More than 70% of bill records fall after day 20
    pub late_month_bills: bool,
}

/// Features computed fresh for one category on every call
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    pub current_total: f64,
    /// Distinct calendar days with at least one current record.
    /// Counted by full date, so it equals the number of days of month only
    /// while the current records stay within one calendar month.
    pub days_with_spending: usize,
    /// Latest day-of-month among current records (at least 1)
    pub days_elapsed: u32,
    /// `current_total / max(days_with_spending, 1)`
    pub daily_average: f64,
    /// `reference_date.day / days_in_month`
    pub month_progress: f64,
    /// `days_with_spending / days_elapsed`
    pub spending_frequency: f64,
    pub patterns: PatternFlags,
}

impl DerivedFeatures {
    /// Derive features for `category` from its current and historical records
    pub fn compute(
        category: CategoryKind,
        current: &[ExpenseRecord],
        historical: &[ExpenseRecord],
        period: &ReferencePeriod,
    ) -> Self {
        let current_total = total(current);
        let days_with_spending = distinct_days(current);
        let days_elapsed = days_elapsed(current);

        Self {
            current_total,
            days_with_spending,
            days_elapsed,
            daily_average: current_total / days_with_spending.max(1) as f64,
            month_progress: period.month_progress(),
            spending_frequency: days_with_spending as f64 / days_elapsed as f64,
            patterns: detect_patterns(category, current, historical, current_total),
        }
    }
}

/// Sum of amounts
pub fn total(records: &[ExpenseRecord]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}

/// Number of distinct calendar days among the records.
///
/// Dates are compared in full. The current period is assumed to be a single
/// calendar month; records from other months would add days of their own.
pub fn distinct_days(records: &[ExpenseRecord]) -> usize {
    records
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<NaiveDate>>()
        .len()
}

/// Latest day-of-month among the records, never below 1
pub fn days_elapsed(records: &[ExpenseRecord]) -> u32 {
    records.iter().map(|r| r.date.day()).max().unwrap_or(1).max(1)
}

fn detect_patterns(
    category: CategoryKind,
    current: &[ExpenseRecord],
    historical: &[ExpenseRecord],
    current_total: f64,
) -> PatternFlags {
    let mut flags = PatternFlags::default();

    if !historical.is_empty() {
        let n = historical.len() as f64;
        let mut by_weekday: HashMap<Weekday, usize> = HashMap::new();
        for record in historical {
            *by_weekday.entry(record.date.weekday()).or_default() += 1;
        }

        flags.clustered_weekday = by_weekday
            .iter()
            .filter(|(_, &count)| count as f64 / n > WEEKDAY_CLUSTER_SHARE)
            .max_by_key(|(day, &count)| (count, std::cmp::Reverse(day.num_days_from_monday())))
            .map(|(day, _)| *day);

        let weekend = historical
            .iter()
            .filter(|r| matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun))
            .count();
        flags.weekend_heavy = weekend as f64 / n >= WEEKEND_HEAVY_SHARE;

        if category == CategoryKind::Bills {
            let late = historical
                .iter()
                .filter(|r| r.date.day() > LATE_MONTH_DAY)
                .count();
            flags.late_month_bills = late as f64 / n > LATE_BILL_SHARE;
        }
    }

    if current_total > 0.0 {
        flags.large_single_payment = current
            .iter()
            .any(|r| r.amount > current_total * LARGE_PAYMENT_SHARE);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// `count` records on the same weekday as `first`, one week apart
    fn weekly(first: NaiveDate, count: usize) -> Vec<ExpenseRecord> {
        (0..count)
            .map(|week| ExpenseRecord::new(first + Duration::weeks(week as i64), "Food", 10.0))
            .collect()
    }

    /// Ten records for `mondays` of 3 or 4: the rest fall on Tuesday to Thursday
    fn monday_history(mondays: usize) -> Vec<ExpenseRecord> {
        let mut records = weekly(date(2025, 6, 2), mondays);
        records.extend(weekly(date(2025, 6, 3), 3));
        records.extend(weekly(date(2025, 6, 4), 3));
        records.extend(weekly(date(2025, 6, 5), 4 - mondays));
        records
    }

    fn bills_on(days: &[u32]) -> Vec<ExpenseRecord> {
        days.iter()
            .enumerate()
            .map(|(i, &day)| ExpenseRecord::new(date(2025, 1 + i as u32, day), "Bills", 80.0))
            .collect()
    }

    #[test]
    fn test_weekday_cluster_needs_more_than_thirty_percent() {
        let three = monday_history(3);
        let four = monday_history(4);
        assert_eq!(three.len(), 10);
        assert_eq!(four.len(), 10);

        let flags = detect_patterns(CategoryKind::Food, &[], &three, 0.0);
        assert_eq!(flags.clustered_weekday, None);

        let flags = detect_patterns(CategoryKind::Food, &[], &four, 0.0);
        assert_eq!(flags.clustered_weekday, Some(Weekday::Mon));
    }

    #[test]
    fn test_weekend_heavy_at_forty_percent() {
        // 2025-06-07 is a Saturday, 2025-06-08 a Sunday
        let mut heavy = weekly(date(2025, 6, 7), 2);
        heavy.extend(weekly(date(2025, 6, 8), 2));
        heavy.extend(weekly(date(2025, 6, 2), 3));
        heavy.extend(weekly(date(2025, 6, 3), 3));

        let mut light = weekly(date(2025, 6, 7), 2);
        light.extend(weekly(date(2025, 6, 8), 1));
        light.extend(weekly(date(2025, 6, 2), 3));
        light.extend(weekly(date(2025, 6, 3), 3));
        light.extend(weekly(date(2025, 6, 4), 1));

        assert!(detect_patterns(CategoryKind::Shopping, &[], &heavy, 0.0).weekend_heavy);
        assert!(!detect_patterns(CategoryKind::Shopping, &[], &light, 0.0).weekend_heavy);
    }

    #[test]
    fn test_large_single_payment_must_exceed_half() {
        let large = vec![
            ExpenseRecord::new(date(2025, 7, 2), "Shopping", 60.0),
            ExpenseRecord::new(date(2025, 7, 5), "Shopping", 20.0),
            ExpenseRecord::new(date(2025, 7, 9), "Shopping", 20.0),
        ];
        let even = vec![
            ExpenseRecord::new(date(2025, 7, 2), "Shopping", 50.0),
            ExpenseRecord::new(date(2025, 7, 5), "Shopping", 25.0),
            ExpenseRecord::new(date(2025, 7, 9), "Shopping", 25.0),
        ];

        let flags = detect_patterns(CategoryKind::Shopping, &large, &large, total(&large));
        assert!(flags.large_single_payment);

        let flags = detect_patterns(CategoryKind::Shopping, &even, &even, total(&even));
        assert!(!flags.large_single_payment);
    }

    #[test]
    fn test_late_month_bills_share() {
        let eight_late = bills_on(&[21, 22, 23, 24, 25, 26, 27, 28, 5, 10]);
        let seven_late = bills_on(&[21, 22, 23, 24, 25, 26, 27, 5, 10, 15]);

        assert!(detect_patterns(CategoryKind::Bills, &[], &eight_late, 0.0).late_month_bills);
        assert!(!detect_patterns(CategoryKind::Bills, &[], &seven_late, 0.0).late_month_bills);
    }

    #[test]
    fn test_day_twenty_is_not_late() {
        let on_twentieth = bills_on(&[20; 10]);
        let on_twenty_first = bills_on(&[21; 10]);

        assert!(!detect_patterns(CategoryKind::Bills, &[], &on_twentieth, 0.0).late_month_bills);
        assert!(detect_patterns(CategoryKind::Bills, &[], &on_twenty_first, 0.0).late_month_bills);
    }

    #[test]
    fn test_late_month_flag_only_for_bills() {
        let late = bills_on(&[25; 10]);

        assert!(!detect_patterns(CategoryKind::Food, &[], &late, 0.0).late_month_bills);
        assert!(!detect_patterns(CategoryKind::Education, &[], &late, 0.0).late_month_bills);
    }

    #[test]
    fn test_compute_counts_distinct_days() {
        let current = vec![
            ExpenseRecord::new(date(2025, 7, 3), "Food", 12.0),
            ExpenseRecord::new(date(2025, 7, 3), "Food", 8.0),
            ExpenseRecord::new(date(2025, 7, 10), "Food", 10.0),
        ];
        let period = ReferencePeriod::from_records(&current, date(2025, 1, 1));

        let features = DerivedFeatures::compute(CategoryKind::Food, &current, &current, &period);

        assert_eq!(features.current_total, 30.0);
        assert_eq!(features.days_with_spending, 2);
        assert_eq!(features.days_elapsed, 10);
        assert_eq!(features.daily_average, 15.0);
        assert_eq!(features.spending_frequency, 0.2);
    }
}
