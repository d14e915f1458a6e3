use crate::error::{LedgerError, Result};
use chrono::{Datelike, Days, NaiveDate};

/// Parses an ISO-8601 date string. Full timestamps are accepted and truncated
/// to their first 10 characters (`YYYY-MM-DD`), matching how dates are
/// displayed throughout the system.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    // get() rather than slicing: a non-ASCII byte at the boundary must fall
    // through to the parse error, not panic.
    let date_part = trimmed.get(..10).unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| LedgerError::InvalidDate {
        value: value.to_string(),
        details: e.to_string(),
    })
}

/// Monday of the week containing `date`. The Monday week-start convention is
/// fixed across the whole system (forecast windows, weekly summaries).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Sunday of the week containing `date` (inclusive end of the Monday week).
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date)
        .checked_add_days(Days::new(6))
        .unwrap_or(date)
}

/// "YYYY-MM-DD ~ YYYY-MM-DD" label for the week containing `date`.
pub fn week_range_label(date: NaiveDate) -> String {
    format!(
        "{} ~ {}",
        week_start(date).format("%Y-%m-%d"),
        week_end(date).format("%Y-%m-%d")
    )
}

/// "YYYY-MM" bucket key for monthly grouping.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Whole days from `from` to `to` (negative when `to` precedes `from`).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Formats a currency amount for display. Rounding to 2 decimal places
/// happens only here, never before aggregation.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}
