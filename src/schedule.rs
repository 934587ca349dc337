// Calendar-date arithmetic for task durations

use chrono::{Duration, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// End date reached `days` after `start`, or `None` past chrono's date range
pub fn end_from_duration(start: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|d| start.checked_add_signed(d))
}

/// Whole days from `start` to `end`; negative when `end` precedes `start`
///
/// Both sides are calendar dates, so the ceiling of the day difference is the
/// difference itself.
pub fn duration_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Local calendar date, used to stamp new tasks
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
