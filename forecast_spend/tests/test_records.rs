mod common;

use common::date;
use forecast_spend::records::{
    format_date, format_timestamp, group_by_category, load_historical, parse_date, parse_records,
};
use forecast_spend::{ExpenseRecord, ForecastError, RecordPolicy};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

#[rstest]
#[case("2025-07-17", date(2025, 7, 17))]
#[case("2025-07-17T00:00:00Z", date(2025, 7, 17))]
#[case("2025-07-17T23:59:59Z", date(2025, 7, 17))]
#[case("2025-07-17T08:30:00", date(2025, 7, 17))]
#[case("2025-07-17T08:30:00.123456", date(2025, 7, 17))]
#[case("2025-07-17T21:00:00-05:00", date(2025, 7, 17))]
#[case(" 2024-02-29 ", date(2024, 2, 29))]
fn test_parse_date_accepts_both_forms(#[case] raw: &str, #[case] expected: chrono::NaiveDate) {
    assert_eq!(parse_date(raw).unwrap(), expected);
}

#[rstest]
#[case("17/07/2025")]
#[case("2025-13-01")]
#[case("2025-02-30")]
#[case("yesterday")]
#[case("2025-07-17Tnoon")]
#[case("")]
fn test_parse_date_rejects_malformed(#[case] raw: &str) {
    let err = parse_date(raw).unwrap_err();
    assert!(matches!(err, ForecastError::MalformedDate(_)));
}

#[rstest]
#[case(date(2025, 1, 1))]
#[case(date(2024, 2, 29))]
#[case(date(1999, 12, 31))]
#[case(date(2030, 6, 15))]
fn test_date_round_trip(#[case] d: chrono::NaiveDate) {
    assert_eq!(parse_date(&format_date(d)).unwrap(), d);
    assert_eq!(parse_date(&format_timestamp(d)).unwrap(), d);
}

#[test]
fn test_parse_records_ignores_extra_fields() {
    let json = r#"[
        {"date": "2025-07-01", "category": "Food", "amount": 12.5, "user_id": 42},
        {"date": "2025-07-02T00:00:00Z", "category": "Bills", "amount": 80}
    ]"#;

    let records = parse_records(json, RecordPolicy::Strict).unwrap();

    assert_eq!(
        records,
        vec![
            ExpenseRecord::new(date(2025, 7, 1), "Food", 12.5),
            ExpenseRecord::new(date(2025, 7, 2), "Bills", 80.0),
        ]
    );
}

#[test]
fn test_parse_records_rejects_non_array() {
    for json in ["not json", r#"{"date": "2025-07-01"}"#, ""] {
        let err = parse_records(json, RecordPolicy::Strict).unwrap_err();
        assert!(matches!(err, ForecastError::InputFormat(_)), "{}", json);
    }
}

#[test]
fn test_empty_array_is_valid() {
    assert!(parse_records("[]", RecordPolicy::Strict).unwrap().is_empty());
}

#[test]
fn test_strict_policy_fails_whole_batch() {
    let json = r#"[
        {"date": "2025-07-01", "category": "Food", "amount": 10},
        {"date": "July 2nd", "category": "Food", "amount": 10}
    ]"#;

    let err = parse_records(json, RecordPolicy::Strict).unwrap_err();
    assert!(matches!(err, ForecastError::MalformedDate(_)));
}

#[test]
fn test_skip_invalid_policy_keeps_good_records() {
    let json = r#"[
        {"date": "2025-07-01", "category": "Food", "amount": 10},
        {"date": "July 2nd", "category": "Food", "amount": 10},
        {"date": "2025-07-03", "category": "Food", "amount": -4},
        {"date": "2025-07-04", "category": "Food"},
        {"date": "2025-07-05", "category": "Transport", "amount": 3.25}
    ]"#;

    let records = parse_records(json, RecordPolicy::SkipInvalid).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].category, "Transport");
}

#[test]
fn test_load_historical_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_historical(dir.path().join("absent.json"), RecordPolicy::Strict).unwrap_err();
    assert!(matches!(err, ForecastError::MissingHistoricalFile(_)));
}

#[test]
fn test_load_historical_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"[{{"date": "2025-06-03", "category": "Food", "amount": 20, "user_id": 7}},
            {{"date": "2025-06-04", "category": "Food", "amount": 22}}]"#
    )
    .unwrap();

    let records = load_historical(file.path(), RecordPolicy::Strict).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, date(2025, 6, 3));
}

#[test]
fn test_group_by_category_keeps_order_and_case() {
    let records = vec![
        ExpenseRecord::new(date(2025, 7, 3), "Food", 1.0),
        ExpenseRecord::new(date(2025, 7, 1), "food", 2.0),
        ExpenseRecord::new(date(2025, 7, 2), "Food", 3.0),
    ];

    let groups = group_by_category(&records);

    assert_eq!(groups.len(), 2);
    let food: Vec<f64> = groups["Food"].iter().map(|r| r.amount).collect();
    assert_eq!(food, vec![1.0, 3.0]);
}
