//! Built-in holiday calendars used as forecaster regressors

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Same month and day every year
    Fixed { month: u32, day: u32 },
    /// n-th occurrence of a weekday in a month
    NthWeekday { month: u32, weekday: Weekday, n: u8 },
    /// Last occurrence of a weekday in a month
    LastWeekday { month: u32, weekday: Weekday },
}

#[derive(Debug, Clone, Copy)]
struct HolidayRule {
    name: &'static str,
    rule: Rule,
    /// First year the holiday is observed
    since: i32,
}

const US_FEDERAL: &[HolidayRule] = &[
    HolidayRule {
        name: "New Year's Day",
        rule: Rule::Fixed { month: 1, day: 1 },
        since: 1870,
    },
    HolidayRule {
        name: "Martin Luther King Jr. Day",
        rule: Rule::NthWeekday { month: 1, weekday: Weekday::Mon, n: 3 },
        since: 1986,
    },
    HolidayRule {
        name: "Washington's Birthday",
        rule: Rule::NthWeekday { month: 2, weekday: Weekday::Mon, n: 3 },
        since: 1971,
    },
    HolidayRule {
        name: "Memorial Day",
        rule: Rule::LastWeekday { month: 5, weekday: Weekday::Mon },
        since: 1971,
    },
    HolidayRule {
        name: "Juneteenth National Independence Day",
        rule: Rule::Fixed { month: 6, day: 19 },
        since: 2021,
    },
    HolidayRule {
        name: "Independence Day",
        rule: Rule::Fixed { month: 7, day: 4 },
        since: 1870,
    },
    HolidayRule {
        name: "Labor Day",
        rule: Rule::NthWeekday { month: 9, weekday: Weekday::Mon, n: 1 },
        since: 1894,
    },
    HolidayRule {
        name: "Columbus Day",
        rule: Rule::NthWeekday { month: 10, weekday: Weekday::Mon, n: 2 },
        since: 1971,
    },
    HolidayRule {
        name: "Veterans Day",
        rule: Rule::Fixed { month: 11, day: 11 },
        since: 1938,
    },
    HolidayRule {
        name: "Thanksgiving",
        rule: Rule::NthWeekday { month: 11, weekday: Weekday::Thu, n: 4 },
        since: 1870,
    },
    HolidayRule {
        name: "Christmas Day",
        rule: Rule::Fixed { month: 12, day: 25 },
        since: 1870,
    },
];

impl HolidayRule {
    fn date_in(&self, year: i32) -> Option<NaiveDate> {
        if year < self.since {
            return None;
        }
        match self.rule {
            Rule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            Rule::NthWeekday { month, weekday, n } => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
            }
            Rule::LastWeekday { month, weekday } => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
                    .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4))
            }
        }
    }
}

/// A region's public holidays
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    region: String,
    rules: &'static [HolidayRule],
}

impl HolidayCalendar {
    /// Look up the calendar for a region code (case-insensitive)
    pub fn for_region(code: &str) -> Result<Self> {
        let region = code.trim().to_uppercase();
        let rules = match region.as_str() {
            "US" | "USA" => US_FEDERAL,
            _ => {
                return Err(ForecastError::HolidaysUnavailable(format!(
                    "no holiday calendar for region {:?}",
                    code
                )))
            }
        };

        Ok(Self { region, rules })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Names of every holiday in the calendar
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Holiday falling on `date`, if any
    pub fn holiday_on(&self, date: NaiveDate) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.date_in(date.year()) == Some(date))
            .map(|rule| rule.name)
    }
}
