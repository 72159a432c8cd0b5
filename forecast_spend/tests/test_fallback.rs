mod common;

use approx::assert_relative_eq;
use common::record;
use forecast_spend::FallbackEstimator;
use rstest::rstest;

#[test]
fn test_single_day_food_extrapolation() {
    let current = vec![
        record("2025-07-17", "Food", 30.0),
        record("2025-07-17", "Food", 35.0),
        record("2025-07-17", "Food", 38.0),
    ];

    let total = FallbackEstimator::new().estimate(&current, "Food", 14);

    // 103 + 103 * 14 * (1 / 17) * 0.8
    assert_relative_eq!(total, 103.0 + 103.0 * 14.0 / 17.0 * 0.8, epsilon = 1e-9);
}

#[rstest]
#[case("Bills", 120.0)]
#[case("bills", 120.0)]
#[case("Education", 130.0)]
fn test_share_based_categories(#[case] category: &str, #[case] expected: f64) {
    let current = vec![
        record("2025-07-02", category, 60.0),
        record("2025-07-09", category, 40.0),
    ];

    let total = FallbackEstimator::new().estimate(&current, category, 10);
    assert_relative_eq!(total, expected, epsilon = 1e-9);
}

#[rstest]
#[case("Food")]
#[case("Bills")]
#[case("Education")]
#[case("Gadgets")]
fn test_zero_remaining_days_returns_current_total(#[case] category: &str) {
    let current = vec![
        record("2025-07-30", category, 12.25),
        record("2025-07-31", category, 7.5),
    ];

    let total = FallbackEstimator::new().estimate(&current, category, 0);
    assert_eq!(total, 19.75);
}

#[rstest]
#[case("Food")]
#[case("Bills")]
#[case("Shopping")]
fn test_monotone_in_current_total(#[case] category: &str) {
    let estimator = FallbackEstimator::new();
    let mut previous = f64::NEG_INFINITY;

    for amount in [0.0, 1.0, 5.0, 20.0, 100.0, 1000.0] {
        let current = vec![
            record("2025-07-05", category, amount),
            record("2025-07-12", category, amount / 2.0),
        ];
        let total = estimator.estimate(&current, category, 12);
        assert!(total >= previous, "{} decreased at {}", category, amount);
        assert!(total >= amount * 1.5);
        previous = total;
    }
}

#[test]
fn test_empty_records_are_defined() {
    let total = FallbackEstimator::new().estimate(&[], "Food", 10);
    assert_eq!(total, 0.0);
}
