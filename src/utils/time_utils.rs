use chrono::{Datelike, NaiveDate, Utc};

use crate::errors::Result;

/// Parses a calendar date from its canonical `YYYY-MM-DD` wire form.
///
/// All dates cross the engine boundary as plain calendar dates with no
/// time-of-day component. Parsing them explicitly (instead of going through a
/// timestamp type) avoids the classic timezone-induced off-by-one-day drift.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?)
}

/// Today as a calendar date. The engine has no timezone concept, so the UTC
/// calendar day is the canonical "now".
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let next = next_month_start(date);
    next.pred_opt().unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // Day 1 of a valid year/month always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Returns the first-of-month dates from `start`'s month through `end`'s
/// month, inclusive, with no gaps.
pub fn get_months_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let first = month_start(start);
    let last = month_start(end);
    if first > last {
        return Vec::new();
    }
    let mut months = Vec::new();
    let mut current = first;
    while current <= last {
        months.push(current);
        current = next_month_start(current);
    }
    months
}
