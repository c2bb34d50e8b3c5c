use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate};

use crate::domain::calendar::month_name;

/// Parse a YYYY-MM month argument into the first day of that month
pub fn parse_month_arg(month_str: &str) -> Option<NaiveDate> {
    let (year, month) = month_str.trim().split_once('-')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Format a date for display (e.g., "January 15, 2025")
pub fn format_date_for_display(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date.month()), date.day(), date.year())
}

/// Format an entry timestamp as its local calendar date
pub fn format_timestamp_for_display(timestamp: &DateTime<FixedOffset>) -> String {
    format_date_for_display(timestamp.with_timezone(&Local).date_naive())
}
